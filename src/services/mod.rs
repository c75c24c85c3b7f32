// linkkeeper services
// Services provide the archive workflow, its persistence and the settings engine.

pub mod archive_container;
pub mod archive_service;
pub mod rating_archive_codec;
pub mod settings_engine;
