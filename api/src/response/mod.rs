use serde::Serialize;

/// Standard JSON envelope for every HTTP response:
///
/// ```json
/// { "success": true, "data": { ... }, "message": "Room created successfully" }
/// ```
///
/// Error responses carry `data` at its default value.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Empty `data` payload for error responses.
#[derive(Serialize, Default)]
pub struct Empty {}
