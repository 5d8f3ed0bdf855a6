//! The five templates one generation run needs, with built-in defaults and
//! per-file directory overrides.

use std::path::Path;

use cyclusgen_shared::{CyclusGenError, Result, SpecialModes};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::Template;

/// Broad reactor class; each class renders through its own template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactorClass {
    /// Large light-water units (PWR, BWR and their derivatives).
    LightWater,
    /// Small modular units.
    SmallModular,
}

const BUILTIN_LWR: &str = include_str!("builtin/lwr.xml");
const BUILTIN_LWR_CYBORG: &str = include_str!("builtin/lwr_cyborg.xml");
const BUILTIN_LWR_F33: &str = include_str!("builtin/lwr_f33.xml");
const BUILTIN_SMR: &str = include_str!("builtin/smr.xml");
const BUILTIN_DEPLOYINST: &str = include_str!("builtin/deployinst.xml");
const BUILTIN_REGION: &str = include_str!("builtin/region.xml");
const BUILTIN_INPUT: &str = include_str!("builtin/input.xml");

/// File names understood by [`TemplateSet::from_dir`], with their built-in text.
pub const BUILTIN_FILES: [(&str, &str); 7] = [
    ("lwr.xml", BUILTIN_LWR),
    ("lwr_cyborg.xml", BUILTIN_LWR_CYBORG),
    ("lwr_f33.xml", BUILTIN_LWR_F33),
    ("smr.xml", BUILTIN_SMR),
    ("deployinst.xml", BUILTIN_DEPLOYINST),
    ("region.xml", BUILTIN_REGION),
    ("input.xml", BUILTIN_INPUT),
];

/// Templates for one run, already resolved against the special modes.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub lwr: Template,
    pub smr: Template,
    pub deployinst: Template,
    pub region: Template,
    pub input: Template,
}

impl TemplateSet {
    /// The built-in Cyclus templates.
    pub fn builtin(modes: &SpecialModes) -> Self {
        let (lwr_file, lwr_text) = light_water_variant(modes);
        Self {
            lwr: Template::new(lwr_file, lwr_text),
            smr: Template::new("smr.xml", BUILTIN_SMR),
            deployinst: Template::new("deployinst.xml", BUILTIN_DEPLOYINST),
            region: Template::new("region.xml", BUILTIN_REGION),
            input: Template::new("input.xml", BUILTIN_INPUT),
        }
    }

    /// Built-in templates, with any file present in `dir` taking precedence.
    pub fn from_dir(dir: &Path, modes: &SpecialModes) -> Result<Self> {
        if !dir.is_dir() {
            return Err(CyclusGenError::config(format!(
                "template directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut set = Self::builtin(modes);
        for template in [
            &mut set.lwr,
            &mut set.smr,
            &mut set.deployinst,
            &mut set.region,
            &mut set.input,
        ] {
            let path = dir.join(template.name());
            if !path.exists() {
                continue;
            }
            let text =
                std::fs::read_to_string(&path).map_err(|e| CyclusGenError::io(&path, e))?;
            debug!(path = %path.display(), "template override loaded");
            *template = Template::new(template.name().to_string(), text);
        }

        info!(dir = %dir.display(), "templates resolved");
        Ok(set)
    }

    /// Reactor template for a class.
    pub fn reactor(&self, class: ReactorClass) -> &Template {
        match class {
            ReactorClass::LightWater => &self.lwr,
            ReactorClass::SmallModular => &self.smr,
        }
    }
}

/// File name and built-in text of the light-water template; f33 wins over
/// cyborg when both are requested.
fn light_water_variant(modes: &SpecialModes) -> (&'static str, &'static str) {
    if modes.f33 {
        ("lwr_f33.xml", BUILTIN_LWR_F33)
    } else if modes.cyborg {
        ("lwr_cyborg.xml", BUILTIN_LWR_CYBORG)
    } else {
        ("lwr.xml", BUILTIN_LWR)
    }
}
