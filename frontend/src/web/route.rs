//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问级别以及守卫决策。

use crate::notify::Notice;
use crate::session::Role;
use autoserve_shared::ServiceCategory;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    Signup,
    Login,
    Otp,
    /// 客户首页 (默认路由)
    #[default]
    Dashboard,
    /// 添加车辆
    VehicleForm,
    /// 六个预约表单共用一个路由变体
    Booking(ServiceCategory),
    PaymentSuccess,
    AdminLogin,
    AdminDashboard,
    AdminOrders,
    AdminOrderDetail(String),
    /// 页面未找到
    NotFound,
}

/// 路由访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 登录/注册类页面；该角色已登录时离开
    Public(Role),
    Customer,
    Admin,
    /// 任何人都可访问（404）
    Open,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 查询串与末尾的 `/` 会被忽略。
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match path {
            "/" => Self::Dashboard,
            "/signup" => Self::Signup,
            "/login" => Self::Login,
            "/otp" => Self::Otp,
            "/form" => Self::VehicleForm,
            "/payment-success" => Self::PaymentSuccess,
            "/admin/login" => Self::AdminLogin,
            "/admin" => Self::AdminDashboard,
            "/admin/orders" => Self::AdminOrders,
            other => {
                if let Some(category) = ServiceCategory::from_route_path(other) {
                    return Self::Booking(category);
                }
                match other.strip_prefix("/admin/orders/") {
                    Some(id) if !id.is_empty() && !id.contains('/') => {
                        Self::AdminOrderDetail(id.to_string())
                    }
                    _ => Self::NotFound,
                }
            }
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Signup => "/signup".to_string(),
            Self::Login => "/login".to_string(),
            Self::Otp => "/otp".to_string(),
            Self::Dashboard => "/".to_string(),
            Self::VehicleForm => "/form".to_string(),
            Self::Booking(category) => category.route_path().to_string(),
            Self::PaymentSuccess => "/payment-success".to_string(),
            Self::AdminLogin => "/admin/login".to_string(),
            Self::AdminDashboard => "/admin".to_string(),
            Self::AdminOrders => "/admin/orders".to_string(),
            Self::AdminOrderDetail(id) => format!("/admin/orders/{id}"),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫属性：定义该路由的访问级别**
    pub fn access(&self) -> Access {
        match self {
            Self::Signup | Self::Login | Self::Otp => Access::Public(Role::User),
            Self::AdminLogin => Access::Public(Role::Admin),
            Self::Dashboard
            | Self::VehicleForm
            | Self::Booking(_)
            | Self::PaymentSuccess => Access::Customer,
            Self::AdminDashboard | Self::AdminOrders | Self::AdminOrderDetail(_) => Access::Admin,
            Self::NotFound => Access::Open,
        }
    }

    /// 未登录客户访问受保护页面时的去向
    pub fn customer_entry() -> Self {
        Self::Signup
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 守卫
// =========================================================

/// 守卫所需的认证快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthSnapshot {
    pub loading: bool,
    pub user: bool,
    pub admin: bool,
}

impl AuthSnapshot {
    pub fn has(&self, role: Role) -> bool {
        match role {
            Role::User => self.user,
            Role::Admin => self.admin,
        }
    }
}

/// 页面外层的导航框架
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    None,
    Customer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 认证状态尚未就绪，渲染占位
    Wait,
    Allow(Shell),
    Redirect {
        to: AppRoute,
        notice: Option<Notice>,
    },
}

/// 路由守卫
///
/// 客户与管理员会话互斥：
/// 管理员会话存在时访问客户页面 => `/admin`；
/// 只有客户会话时访问管理页面 => `/`。
pub fn guard(route: &AppRoute, auth: AuthSnapshot) -> GuardDecision {
    if auth.loading {
        return GuardDecision::Wait;
    }

    match route.access() {
        Access::Open => GuardDecision::Allow(Shell::None),
        Access::Public(role) if auth.has(role) => GuardDecision::Redirect {
            to: role.home(),
            notice: None,
        },
        Access::Public(_) => GuardDecision::Allow(Shell::None),
        Access::Customer if auth.admin => GuardDecision::Redirect {
            to: AppRoute::AdminDashboard,
            notice: Some(Notice::info("Admins use the admin dashboard")),
        },
        Access::Customer if !auth.user => GuardDecision::Redirect {
            to: AppRoute::customer_entry(),
            notice: Some(Notice::error("Please sign up or log in to continue")),
        },
        Access::Customer => GuardDecision::Allow(Shell::Customer),
        Access::Admin if auth.admin => GuardDecision::Allow(Shell::Admin),
        Access::Admin if auth.user => GuardDecision::Redirect {
            to: AppRoute::Dashboard,
            notice: Some(Notice::error("Admin access required")),
        },
        Access::Admin => GuardDecision::Redirect {
            to: AppRoute::AdminLogin,
            notice: Some(Notice::error("Please log in as an administrator")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOBODY: AuthSnapshot = AuthSnapshot {
        loading: false,
        user: false,
        admin: false,
    };
    const CUSTOMER: AuthSnapshot = AuthSnapshot {
        loading: false,
        user: true,
        admin: false,
    };
    const ADMIN: AuthSnapshot = AuthSnapshot {
        loading: false,
        user: false,
        admin: true,
    };

    fn redirect_target(decision: GuardDecision) -> Option<AppRoute> {
        match decision {
            GuardDecision::Redirect { to, .. } => Some(to),
            _ => None,
        }
    }

    #[test]
    fn test_path_round_trip_for_every_route() {
        let mut routes = vec![
            AppRoute::Signup,
            AppRoute::Login,
            AppRoute::Otp,
            AppRoute::Dashboard,
            AppRoute::VehicleForm,
            AppRoute::PaymentSuccess,
            AppRoute::AdminLogin,
            AppRoute::AdminDashboard,
            AppRoute::AdminOrders,
            AppRoute::AdminOrderDetail("64f1c2".to_string()),
        ];
        routes.extend(ServiceCategory::ALL.into_iter().map(AppRoute::Booking));

        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn test_from_path_ignores_query_and_trailing_slash() {
        assert_eq!(
            AppRoute::from_path("/payment-success?session_id=cs_123"),
            AppRoute::PaymentSuccess
        );
        assert_eq!(
            AppRoute::from_path("/battery-services/"),
            AppRoute::Booking(ServiceCategory::Battery)
        );
        assert_eq!(AppRoute::from_path(""), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/admin/orders/a/b"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/dashboard"), AppRoute::NotFound);
    }

    #[test]
    fn test_loading_always_waits() {
        let loading = AuthSnapshot {
            loading: true,
            ..CUSTOMER
        };
        assert_eq!(guard(&AppRoute::Dashboard, loading), GuardDecision::Wait);
        assert_eq!(guard(&AppRoute::Login, loading), GuardDecision::Wait);
    }

    #[test]
    fn test_customer_routes() {
        let decision = guard(&AppRoute::Booking(ServiceCategory::Tire), NOBODY);
        match decision {
            GuardDecision::Redirect { to, notice } => {
                assert_eq!(to, AppRoute::Signup);
                assert!(notice.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            guard(&AppRoute::VehicleForm, CUSTOMER),
            GuardDecision::Allow(Shell::Customer)
        );
        assert_eq!(
            redirect_target(guard(&AppRoute::Dashboard, ADMIN)),
            Some(AppRoute::AdminDashboard)
        );
    }

    #[test]
    fn test_admin_routes_are_symmetric() {
        assert_eq!(
            guard(&AppRoute::AdminOrders, ADMIN),
            GuardDecision::Allow(Shell::Admin)
        );
        assert_eq!(
            redirect_target(guard(&AppRoute::AdminOrders, NOBODY)),
            Some(AppRoute::AdminLogin)
        );
        assert_eq!(
            redirect_target(guard(&AppRoute::AdminDashboard, CUSTOMER)),
            Some(AppRoute::Dashboard)
        );
    }

    #[test]
    fn test_both_sessions_prefer_admin() {
        let both = AuthSnapshot {
            loading: false,
            user: true,
            admin: true,
        };
        assert_eq!(
            redirect_target(guard(&AppRoute::Dashboard, both)),
            Some(AppRoute::AdminDashboard)
        );
        assert_eq!(
            guard(&AppRoute::AdminDashboard, both),
            GuardDecision::Allow(Shell::Admin)
        );
    }

    #[test]
    fn test_public_routes_bounce_logged_in_role() {
        assert_eq!(
            redirect_target(guard(&AppRoute::Login, CUSTOMER)),
            Some(AppRoute::Dashboard)
        );
        assert_eq!(
            redirect_target(guard(&AppRoute::AdminLogin, ADMIN)),
            Some(AppRoute::AdminDashboard)
        );
        // 客户登录页对管理员会话没有意义，但不阻止
        assert_eq!(guard(&AppRoute::Login, ADMIN), GuardDecision::Allow(Shell::None));
        assert_eq!(guard(&AppRoute::NotFound, NOBODY), GuardDecision::Allow(Shell::None));
    }
}
