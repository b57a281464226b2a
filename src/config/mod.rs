// ==========================================
// CSV 导入工作进程 - 配置层
// ==========================================
// 职责:
// - Settings: 启动配置（环境变量）
// - ConfigManager: 运行期配置（config_kv 表）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use settings::{AppEnv, Settings, SettingsError, SettingsResult};
