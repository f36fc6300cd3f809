//! 表单数据与校验
//!
//! 每个表单持有原始输入，`validate` 负责在请求发出前校验并转换为请求对象。
//! 组件层只负责把输入框绑定到这些字段上。

use autoserve_shared::ValidationError;
use autoserve_shared::protocol::SignupRequest;
use autoserve_shared::NewVehicle;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const OTP_LEN: usize = 6;
/// 最早可登记的车辆年份
pub const MIN_VEHICLE_YEAR: i32 = 1980;

pub const FUEL_TYPES: [&str; 5] = ["Petrol", "Diesel", "Electric", "Hybrid", "CNG"];

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

/// 只检查基本形状：`local@domain.tld`
fn email(value: &str) -> Result<String, ValidationError> {
    let value = required(value, "Email")?;
    let well_formed = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.starts_with('.')
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
    }) && !value.contains(char::is_whitespace);

    if !well_formed {
        return Err(ValidationError::Invalid {
            field: "Email",
            reason: "enter a valid email address",
        });
    }
    Ok(value.to_lowercase())
}

// =========================================================
// 登录
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// 返回 (email, password)
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        Ok((email, self.password.clone()))
    }
}

// =========================================================
// 注册
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupRequest, ValidationError> {
        let name = required(&self.name, "Name")?;
        let email = email(&self.email)?;
        let phone = phone(&self.phone)?;

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::Invalid {
                field: "Password",
                reason: "must be at least 6 characters",
            });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::Invalid {
                field: "Confirm password",
                reason: "passwords do not match",
            });
        }

        Ok(SignupRequest {
            name,
            email,
            phone,
            password: self.password.clone(),
        })
    }
}

/// 允许常见分隔符，去掉后需要 7 到 15 位数字
fn phone(value: &str) -> Result<String, ValidationError> {
    let value = required(value, "Phone")?;
    let invalid = ValidationError::Invalid {
        field: "Phone",
        reason: "enter a valid phone number",
    };

    let mut digits = String::new();
    for (i, c) in value.chars().enumerate() {
        match c {
            '0'..='9' => digits.push(c),
            '+' if i == 0 => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return Err(invalid),
        }
    }

    let count = digits.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&count) {
        return Err(invalid);
    }
    Ok(digits)
}

// =========================================================
// OTP
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpForm {
    pub email: String,
    pub code: String,
}

impl OtpForm {
    /// 返回 (email, code)
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let email = email(&self.email)?;
        let code = self.code.trim();
        if code.len() != OTP_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::Invalid {
                field: "Verification code",
                reason: "enter the 6-digit code from your email",
            });
        }
        Ok((email, code.to_string()))
    }
}

// =========================================================
// 车辆
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleForm {
    pub make: String,
    pub model: String,
    pub year: String,
    pub license_plate: String,
    pub color: String,
    pub fuel_type: String,
}

impl Default for VehicleForm {
    fn default() -> Self {
        Self {
            make: String::new(),
            model: String::new(),
            year: String::new(),
            license_plate: String::new(),
            color: String::new(),
            fuel_type: FUEL_TYPES[0].to_string(),
        }
    }
}

impl VehicleForm {
    pub fn validate(&self, user_id: &str, current_year: i32) -> Result<NewVehicle, ValidationError> {
        let make = required(&self.make, "Make")?;
        let model = required(&self.model, "Model")?;
        let year_text = required(&self.year, "Year")?;

        let year = year_text
            .parse::<i32>()
            .ok()
            .filter(|y| (MIN_VEHICLE_YEAR..=current_year + 1).contains(y))
            .and_then(|y| u16::try_from(y).ok())
            .ok_or(ValidationError::Invalid {
                field: "Year",
                reason: "enter a year between 1980 and next year",
            })?;

        let license_plate = required(&self.license_plate, "License plate")?.to_uppercase();
        let color = required(&self.color, "Color")?;

        if !FUEL_TYPES.contains(&self.fuel_type.as_str()) {
            return Err(ValidationError::Invalid {
                field: "Fuel type",
                reason: "choose one of the listed fuel types",
            });
        }

        Ok(NewVehicle {
            user_id: user_id.to_string(),
            make,
            model,
            year,
            license_plate,
            color,
            fuel_type: self.fuel_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            name: " Ana Lima ".to_string(),
            email: "Ana@Example.com".to_string(),
            phone: "+1 (555) 010-0199".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_login_requires_email_shape_and_password() {
        let mut form = LoginForm {
            email: "ana@example".to_string(),
            password: "pw".to_string(),
        };
        assert!(matches!(form.validate(), Err(ValidationError::Invalid { field: "Email", .. })));

        form.email = "ana@example.com".to_string();
        form.password.clear();
        assert_eq!(form.validate(), Err(ValidationError::Required("Password")));

        form.password = "pw".to_string();
        assert_eq!(
            form.validate(),
            Ok(("ana@example.com".to_string(), "pw".to_string()))
        );
    }

    #[test]
    fn test_signup_normalizes_fields() {
        let req = signup().validate().unwrap();
        assert_eq!(req.name, "Ana Lima");
        assert_eq!(req.email, "ana@example.com");
        assert_eq!(req.phone, "+15550100199");
    }

    #[test]
    fn test_signup_rejections() {
        let mut form = signup();
        form.password = "12345".to_string();
        form.confirm_password = "12345".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::Invalid { field: "Password", .. })));

        let mut form = signup();
        form.confirm_password = "secret2".to_string();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::Invalid { field: "Confirm password", .. })
        ));

        let mut form = signup();
        form.phone = "555-CALL-NOW".to_string();
        assert!(matches!(form.validate(), Err(ValidationError::Invalid { field: "Phone", .. })));

        let mut form = signup();
        form.name = "   ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::Required("Name")));
    }

    #[test]
    fn test_otp_must_be_six_digits() {
        let mut form = OtpForm {
            email: "ana@example.com".to_string(),
            code: "12345".to_string(),
        };
        assert!(form.validate().is_err());
        form.code = "12a456".to_string();
        assert!(form.validate().is_err());
        form.code = " 123456 ".to_string();
        assert_eq!(form.validate().unwrap().1, "123456");
    }

    #[test]
    fn test_vehicle_year_range() {
        let mut form = VehicleForm {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: "2027".to_string(),
            license_plate: "abc-123".to_string(),
            color: "Blue".to_string(),
            ..Default::default()
        };
        let vehicle = form.validate("u1", 2026).unwrap();
        assert_eq!(vehicle.year, 2027);
        assert_eq!(vehicle.license_plate, "ABC-123");
        assert_eq!(vehicle.fuel_type, "Petrol");

        form.year = "2028".to_string();
        assert!(form.validate("u1", 2026).is_err());
        form.year = "1979".to_string();
        assert!(form.validate("u1", 2026).is_err());
        form.year = "nineteen".to_string();
        assert!(form.validate("u1", 2026).is_err());
    }

    #[test]
    fn test_vehicle_fuel_type_must_be_listed() {
        let form = VehicleForm {
            make: "Tesla".to_string(),
            model: "Model 3".to_string(),
            year: "2022".to_string(),
            license_plate: "EV-1".to_string(),
            color: "White".to_string(),
            fuel_type: "Steam".to_string(),
        };
        assert!(matches!(
            form.validate("u1", 2026),
            Err(ValidationError::Invalid { field: "Fuel type", .. })
        ));
    }
}
