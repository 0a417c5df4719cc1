// Linkbook services
// Services sit beside the engine: the settings file and digit quick navigation.

pub mod quick_nav;
pub mod settings_engine;
