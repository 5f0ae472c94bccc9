pub mod m202510160001_create_rooms;
pub mod m202510160002_create_room_participants;
