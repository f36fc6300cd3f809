use thiserror::Error;

/// 客户端校验错误
///
/// 在任何网络请求发出之前由表单或预约草稿产生，
/// `Display` 文本直接展示给用户。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown service type `{0}`")]
    UnknownServiceType(String),

    #[error("Please choose a value for {0}")]
    MissingAttribute(&'static str),

    #[error("`{value}` is not a valid option for {key}")]
    InvalidAttribute { key: String, value: String },

    #[error("Please choose a date and time for the scheduled service")]
    MissingSchedule,

    #[error("The scheduled date or time could not be understood")]
    InvalidSchedule,

    #[error("The scheduled time is in the past")]
    ScheduleInPast,

    #[error("This service can only be booked on demand")]
    SchedulingUnavailable,

    #[error("Please pick a service location")]
    MissingLocation,

    #[error("Please select a vehicle")]
    MissingVehicle,

    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
