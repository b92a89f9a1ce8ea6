use libbs::{ConfigurationResolver, Logger};

pub fn cmd_config() {
  ConfigurationResolver::standard().log(&Logger::stdout());
}
