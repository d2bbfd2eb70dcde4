pub mod drivers;
pub mod pagination;
pub mod users;
pub mod vehicles;
