//! 预约流程引擎
//!
//! 一个通用状态机，由类别配置驱动：
//! `Select -> Estimate -> Confirm -> Done`，只能前进，或显式后退。
//!
//! 估算是纯计算；只有提交阶段会访问网络。

use crate::api::MarketplaceApi;
use crate::error::ClientError;
use crate::request::HttpClient;
use autoserve_shared::date::schedule_value;
use autoserve_shared::{
    Address, BookingDraft, BookingType, CategoryConfig, DEFAULT_PAYMENT_METHOD,
    DEFAULT_PAYMENT_STATUS, Estimate, Location, NewOrder, NewService, OrderLine, Price, Reference,
    SCHEDULE_NOW, Service, ServiceCategory, ValidationError,
};
use chrono::NaiveDateTime;
use std::fmt::Display;

/// 流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Select,
    Estimate,
    Confirm,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Select => "select",
            Stage::Estimate => "estimate",
            Stage::Confirm => "confirm",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// 提交所需的一切，在第一次 await 之前同步生成
#[derive(Debug, Clone)]
pub struct OrderPlan {
    pub config: &'static CategoryConfig,
    pub token: String,
    pub draft: BookingDraft,
    pub estimate: Estimate,
    pub schedule: Option<NaiveDateTime>,
    pub cached_service_id: Option<String>,
}

/// 下单成功
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    /// 部分后端版本不回传订单
    pub order_id: Option<String>,
    pub service_id: String,
    pub total: Price,
}

/// 下单失败；若服务记录已创建，其 id 会被保留供重试使用
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitFailure {
    pub error: ClientError,
    pub service_id: Option<String>,
}

impl SubmitFailure {
    fn before_service(error: ClientError) -> Self {
        Self {
            error,
            service_id: None,
        }
    }
}

// =========================================================
// 状态机
// =========================================================

#[derive(Debug, Clone)]
pub struct BookingFlow {
    config: &'static CategoryConfig,
    draft: BookingDraft,
    stage: Stage,
    estimate: Option<Estimate>,
    schedule: Option<NaiveDateTime>,
    /// 类别对应的通用服务记录 id（跨 reset 保留）
    service_id: Option<String>,
    submitting: bool,
    receipt: Option<OrderReceipt>,
    last_error: Option<ClientError>,
}

impl BookingFlow {
    pub fn new(category: ServiceCategory) -> Self {
        let config = category.config();
        Self {
            config,
            draft: BookingDraft::new(config),
            stage: Stage::Select,
            estimate: None,
            schedule: None,
            service_id: None,
            submitting: false,
            receipt: None,
            last_error: None,
        }
    }

    pub fn config(&self) -> &'static CategoryConfig {
        self.config
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn estimate(&self) -> Option<&Estimate> {
        self.estimate.as_ref()
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn receipt(&self) -> Option<&OrderReceipt> {
        self.receipt.as_ref()
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    fn invalid(&self, action: &'static str) -> ClientError {
        ClientError::InvalidTransition {
            action,
            stage: self.stage,
        }
    }

    /// 草稿只能在 Select 阶段编辑
    fn editable(&mut self) -> Result<&mut BookingDraft, ClientError> {
        if self.stage != Stage::Select {
            return Err(self.invalid("edit"));
        }
        Ok(&mut self.draft)
    }

    // =========================================================
    // Select: 编辑草稿
    // =========================================================

    pub fn set_service_type(&mut self, key: &str) -> Result<(), ClientError> {
        let config = self.config;
        let draft = self.editable()?;
        config.service_type(key)?;
        draft.service_type = key.to_string();
        Ok(())
    }

    pub fn set_attribute(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        let config = self.config;
        let draft = self.editable()?;
        config.check_attribute(key, value)?;
        draft.attributes.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_booking_type(&mut self, booking_type: BookingType) -> Result<(), ClientError> {
        let config = self.config;
        let draft = self.editable()?;
        if booking_type == BookingType::Scheduled && !config.allows_scheduling {
            return Err(ValidationError::SchedulingUnavailable.into());
        }
        draft.booking_type = booking_type;
        Ok(())
    }

    pub fn set_schedule(&mut self, date: &str, time: &str) -> Result<(), ClientError> {
        let draft = self.editable()?;
        draft.scheduled_date = date.trim().to_string();
        draft.scheduled_time = time.trim().to_string();
        Ok(())
    }

    pub fn set_location(&mut self, location: Location) -> Result<(), ClientError> {
        self.editable()?.location = location;
        Ok(())
    }

    pub fn select_vehicle(&mut self, vehicle_id: Option<String>) -> Result<(), ClientError> {
        self.editable()?.vehicle_id = vehicle_id.filter(|id| !id.trim().is_empty());
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<(), ClientError> {
        self.editable()?.notes = notes.to_string();
        Ok(())
    }

    pub fn set_contact_name(&mut self, name: &str) -> Result<(), ClientError> {
        self.editable()?.contact.contact_name = name.to_string();
        Ok(())
    }

    pub fn set_contact_phone(&mut self, phone: &str) -> Result<(), ClientError> {
        self.editable()?.contact.contact_phone = phone.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), ClientError> {
        self.editable()?.contact.description = description.to_string();
        Ok(())
    }

    /// 表单挂载时加载的服务目录；已有缓存时不覆盖
    pub fn prime_services(&mut self, services: &[Service]) -> bool {
        if self.service_id.is_some() {
            return false;
        }
        self.service_id = find_category_service(self.config, services).map(|s| s.id.clone());
        self.service_id.is_some()
    }

    // =========================================================
    // 阶段转换
    // =========================================================

    /// Select => Estimate：校验并计算估算（不访问网络）
    pub fn request_estimate(&mut self, now: NaiveDateTime) -> Result<Estimate, ClientError> {
        if self.stage != Stage::Select {
            return Err(self.invalid("request an estimate"));
        }
        let schedule = self.draft.validate(self.config, now)?;
        let estimate = self.config.estimate(&self.draft)?;

        self.schedule = schedule;
        self.estimate = Some(estimate);
        self.last_error = None;
        self.stage = Stage::Estimate;
        Ok(estimate)
    }

    pub fn back(&mut self) -> Result<Stage, ClientError> {
        if self.submitting {
            return Err(ClientError::AlreadySubmitting);
        }
        match self.stage {
            Stage::Estimate => {
                self.estimate = None;
                self.schedule = None;
                self.stage = Stage::Select;
            }
            Stage::Confirm => {
                self.last_error = None;
                self.stage = Stage::Estimate;
            }
            Stage::Select | Stage::Done => return Err(self.invalid("go back")),
        }
        Ok(self.stage)
    }

    /// Estimate => Confirm
    pub fn proceed(&mut self) -> Result<(), ClientError> {
        if self.stage != Stage::Estimate {
            return Err(self.invalid("proceed"));
        }
        self.stage = Stage::Confirm;
        Ok(())
    }

    /// 提交前的同步检查；通过后立即置位 `submitting`
    pub fn begin_submit(&mut self, customer_token: Option<&str>) -> Result<OrderPlan, ClientError> {
        if self.stage != Stage::Confirm {
            return Err(self.invalid("submit"));
        }
        if self.submitting {
            return Err(ClientError::AlreadySubmitting);
        }

        let token = customer_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::Unauthenticated)?;

        if self.config.requires_vehicle && self.draft.vehicle_id.is_none() {
            return Err(ValidationError::MissingVehicle.into());
        }

        let Some(estimate) = self.estimate else {
            return Err(self.invalid("submit"));
        };

        self.submitting = true;
        self.last_error = None;
        Ok(OrderPlan {
            config: self.config,
            token: token.to_string(),
            draft: self.draft.clone(),
            estimate,
            schedule: self.schedule,
            cached_service_id: self.service_id.clone(),
        })
    }

    /// 提交结束：成功 => Done；失败 => 留在 Confirm，草稿不变
    pub fn finish_submit(
        &mut self,
        result: Result<OrderReceipt, SubmitFailure>,
    ) -> Result<OrderReceipt, ClientError> {
        self.submitting = false;
        match result {
            Ok(receipt) => {
                self.service_id = Some(receipt.service_id.clone());
                self.receipt = Some(receipt.clone());
                self.stage = Stage::Done;
                Ok(receipt)
            }
            Err(failure) => {
                if let Some(id) = failure.service_id {
                    self.service_id = Some(id);
                }
                self.last_error = Some(failure.error.clone());
                Err(failure.error)
            }
        }
    }

    /// Done => Select，草稿重置；服务 id 缓存保留
    pub fn reset(&mut self) -> Result<(), ClientError> {
        if self.stage != Stage::Done {
            return Err(self.invalid("start over"));
        }
        self.draft = BookingDraft::new(self.config);
        self.estimate = None;
        self.schedule = None;
        self.receipt = None;
        self.last_error = None;
        self.stage = Stage::Select;
        Ok(())
    }
}

// =========================================================
// 提交编排
// =========================================================

/// 按关键字（不区分大小写的子串）查找类别对应的服务记录
pub fn find_category_service<'a>(
    config: &CategoryConfig,
    services: &'a [Service],
) -> Option<&'a Service> {
    let keyword = config.keyword.to_lowercase();
    services
        .iter()
        .find(|s| s.name.to_lowercase().contains(&keyword))
}

/// 找到或创建服务记录
///
/// 创建失败时重新拉取一次列表，以拾取并发客户端刚创建的记录。
async fn resolve_service<C: HttpClient>(
    api: &MarketplaceApi<C>,
    plan: &OrderPlan,
) -> Result<String, ClientError> {
    if let Some(id) = &plan.cached_service_id {
        return Ok(id.clone());
    }

    let config = plan.config;
    let new_service = NewService {
        name: config.title.to_string(),
        description: config.tagline.to_string(),
        category: config.category.slug().to_string(),
        base_price: plan.estimate.price.as_dollars(),
    };

    match api.create_service(&new_service, &plan.token).await {
        Ok(service) => {
            tracing::info!("created service record {} for {}", service.id, config.category);
            Ok(service.id)
        }
        Err(create_err) => {
            tracing::warn!("service create failed ({create_err}), re-fetching catalog");
            let services = api.list_services(Some(&plan.token)).await.map_err(|e| {
                tracing::warn!("catalog re-fetch failed: {e}");
                create_err.clone()
            })?;
            find_category_service(config, &services)
                .map(|s| s.id.clone())
                .ok_or(create_err)
        }
    }
}

/// 执行一次下单
pub async fn place_order<C: HttpClient>(
    api: &MarketplaceApi<C>,
    plan: &OrderPlan,
) -> Result<OrderReceipt, SubmitFailure> {
    let service_id = resolve_service(api, plan)
        .await
        .map_err(SubmitFailure::before_service)?;

    let config = plan.config;
    let draft = &plan.draft;

    // 显示名尽力而为
    let service_name = match api.get_service(&service_id, Some(&plan.token)).await {
        Ok(service) if !service.name.trim().is_empty() => service.name,
        Ok(_) => config.display_name(&draft.service_type),
        Err(e) => {
            tracing::debug!("service lookup failed, using local name: {e}");
            config.display_name(&draft.service_type)
        }
    };

    let order = NewOrder {
        services: vec![OrderLine {
            service: Reference::Id(service_id.clone()),
            service_name,
            price: plan.estimate.price.as_dollars(),
            service_details: draft.service_details(config, &plan.estimate),
        }],
        address: Address {
            full_address: draft.location.full_address.trim().to_string(),
            coordinates: draft.location.coordinates,
        },
        total_amount: plan.estimate.price.as_dollars(),
        scheduled_date: plan
            .schedule
            .map(|at| schedule_value(at, &chrono::Local))
            .unwrap_or_else(|| SCHEDULE_NOW.to_string()),
        special_instructions: draft.special_instructions(),
        payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
        payment_status: DEFAULT_PAYMENT_STATUS.to_string(),
    };

    match api.create_order(&order, &plan.token).await {
        Ok(created) => {
            let order_id = created.map(|o| o.id);
            tracing::info!("order placed: {:?}", order_id);
            Ok(OrderReceipt {
                order_id,
                service_id,
                total: plan.estimate.price,
            })
        }
        Err(error) => {
            tracing::error!("order submission failed: {error}");
            Err(SubmitFailure {
                error,
                service_id: Some(service_id),
            })
        }
    }
}
