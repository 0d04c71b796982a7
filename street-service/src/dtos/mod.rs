pub mod streets;
pub mod users;

pub use streets::{
    CreateStreetRequest, FindStreetsParams, ListMeta, StreetListResponse, StreetResponse,
    UpdateStreetRequest,
};
pub use users::UserResponse;
