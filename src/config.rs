use anyhow::Context;
use oneconfig_commands::factory::CommandSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use toml_edit::{value, DocumentMut};

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, doc: &mut DocumentMut);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, doc: &mut DocumentMut) {
                    doc.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, i64, bool);

// Optional sections are left out of the file until the user writes them.
impl<T> ConfigSerializeDefault for Option<T> {
    fn fix_config(self, _: &str, _: &mut DocumentMut) {}
}

macro_rules! gen_config {
    (
        $( $(#[$doc:meta])* $name:ident: $type:ty = $default:expr),*
    ) => {
        #[derive(Debug, Serialize, Deserialize)]
        pub struct ConsoleConfig {
            $(
                $(#[$doc])*
                pub $name: $type,
            )*
        }

        impl ConsoleConfig {
            /// Reads `config_file`, writing back any missing keys that have a
            /// default. A missing file is created.
            pub fn load(config_file: &Path) -> anyhow::Result<ConsoleConfig> {
                let str = match fs::read_to_string(config_file) {
                    Ok(str) => str,
                    Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
                    Err(err) => {
                        return Err(err)
                            .with_context(|| format!("reading {}", config_file.display()))
                    }
                };
                let mut doc = str
                    .parse::<DocumentMut>()
                    .with_context(|| format!("parsing {}", config_file.display()))?;

                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, stringify!($name), &mut doc);
                )*

                let patched = doc.to_string();
                if str != patched {
                    fs::write(config_file, &patched)
                        .with_context(|| format!("writing {}", config_file.display()))?;
                }

                toml::from_str(&patched)
                    .with_context(|| format!("reading settings from {}", config_file.display()))
            }
        }
    };
}

gen_config! {
    prompt: String = "> ".to_string(),
    log_directory: String = "./logs".to_string(),
    log_file: String = "oneconfig.log".to_string(),
    /// Show parser failures for every rejected overload.
    trace_dispatch: bool = false,
    /// Line rewrites, e.g. `add = "calc add"`.
    command_aliases: Option<BTreeMap<String, String>> = None,
    /// Extra commands built by the declarative factory.
    commands: Option<Vec<CommandSpec>> = None
}
