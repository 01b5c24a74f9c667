//! `SeaORM` entity definitions.

pub mod text_posts;
