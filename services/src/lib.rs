pub mod room;
pub mod room_service;

pub use room::RoomError;
pub use room_service::RoomService;
