pub mod blocks;
pub mod presets;
pub mod site;

pub use blocks::{analyze, edit, normalize, outline, AnalyzeArgs, EditArgs, NormalizeArgs, OutlineArgs};
pub use presets::{presets, PresetsCommand};
pub use site::{
    check, history, preview, publish, reset, restore, status, theme, CheckArgs, PublishArgs, ResetArgs, RestoreArgs,
    ThemeCommand,
};
