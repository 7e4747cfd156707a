use crate::errors::{ErrorKind, GradebookError};

/// 响应业务码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // 评分相关
    InvalidInput = 4000,
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Forbidden => ErrorCode::Forbidden,
            ErrorKind::InvalidInput => ErrorCode::InvalidInput,
            ErrorKind::Unauthenticated => ErrorCode::Unauthorized,
            ErrorKind::Internal => ErrorCode::InternalServerError,
        }
    }
}

impl From<&GradebookError> for ErrorCode {
    fn from(err: &GradebookError) -> Self {
        err.kind().into()
    }
}
