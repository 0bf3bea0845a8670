//! SeaORM 实体定义，与 `migration` crate 中的表结构一一对应。

pub mod articles;
pub mod comments;
pub mod events;
pub mod users;
