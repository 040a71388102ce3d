//! General settings: logging and validation

use indexmap::IndexMap;
use meshspec_core::Values;
use meshspec_core::spec::{GeneralConfig, LoggingConfig};

use super::{FieldMapper, non_empty, set_opt, split_list, take};
use crate::context::MapperContext;
use crate::error::Result;

const LOG_LEVEL: &str = "global.logging.level";

/// Component used for bare levels such as `info`
const DEFAULT_COMPONENT: &str = "default";

pub struct GeneralMapper;

impl FieldMapper for GeneralMapper {
    type Config = GeneralConfig;
    const NAME: &'static str = "general";

    fn populate_values(config: &GeneralConfig, values: &mut Values, _ctx: &MapperContext<'_>) -> Result<()> {
        if let Some(logging) = &config.logging {
            if !logging.component_levels.is_empty() {
                let joined = logging
                    .component_levels
                    .iter()
                    .map(|(component, level)| format!("{component}:{level}"))
                    .collect::<Vec<_>>()
                    .join(",");
                values.set(LOG_LEVEL, joined)?;
            }
            set_opt(values, "global.logAsJson", logging.log_as_json)?;
        }
        set_opt(values, "galley.enableAnalysis", config.validation_messages)
    }

    fn populate_config(values: &mut Values, _ctx: &MapperContext<'_>) -> Result<Option<GeneralConfig>> {
        let component_levels = take::<String>(values, LOG_LEVEL)?
            .map(|joined| parse_component_levels(&joined))
            .unwrap_or_default();

        let logging = non_empty(LoggingConfig {
            component_levels,
            log_as_json: take(values, "global.logAsJson")?,
        });

        Ok(non_empty(GeneralConfig {
            logging,
            validation_messages: take(values, "galley.enableAnalysis")?,
        }))
    }
}

fn parse_component_levels(joined: &str) -> IndexMap<String, String> {
    split_list(joined)
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((component, level)) => (component.trim().to_string(), level.trim().to_string()),
            None => (DEFAULT_COMPONENT.to_string(), entry),
        })
        .collect()
}
