pub mod room;
pub mod room_participant;

pub use room::Entity as Room;
pub use room_participant::Entity as RoomParticipant;
