pub mod auth;
pub mod response;
pub mod validate_department;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use validate_department::{validate_department_middleware, ValidatedDepartment};
