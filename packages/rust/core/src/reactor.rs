//! Reactor prototype blocks: one per deployed fleet unit, then one per
//! reference class.

use tracing::{debug, instrument, warn};

use cyclusgen_shared::{Coordinates, FleetUnit};
use cyclusgen_templates::{Context, TemplateSet};

use crate::catalog::{REFERENCE_CLASSES, ReactorType, ReferenceClass, SpecProfile};

/// Render the block for one fleet unit.
pub fn render_unit(templates: &TemplateSet, unit: &FleetUnit) -> String {
    let record = &unit.record;
    let reactor_type = ReactorType::from_key(&record.reactor_type);
    if reactor_type.is_fallback() {
        warn!(
            unit = %record.name,
            reactor_type = %record.reactor_type,
            "unknown reactor type, sizing as generic PWR"
        );
    }
    let profile = reactor_type.profile();

    let ctx = reactor_context(
        &record.country,
        &record.reactor_type,
        &record.name,
        record.net_capacity_mwe,
        profile,
        record.position,
    );
    templates.reactor(profile.class).render(&ctx)
}

/// Render the block for a reference class, attributed to `country`.
pub fn render_reference(templates: &TemplateSet, class: &ReferenceClass, country: &str) -> String {
    let profile = class.reactor_type.profile();
    let ctx = reactor_context(country, class.name, class.name, class.capacity_mwe, profile, None);
    templates.reactor(profile.class).render(&ctx)
}

/// All reactor blocks for a run: deployed units in fleet order, then every
/// reference class exactly once. Each block is followed by a newline.
#[instrument(skip_all, fields(units = units.len()))]
pub fn render_reactors(templates: &TemplateSet, units: &[FleetUnit], reference_country: &str) -> String {
    let mut out = String::new();
    let mut rendered = 0usize;

    for unit in units {
        if !unit.lifecycle.is_deployed() {
            debug!(unit = %unit.record.name, "not deployed, no prototype emitted");
            continue;
        }
        out.push_str(&render_unit(templates, unit));
        out.push('\n');
        rendered += 1;
    }

    for class in &REFERENCE_CLASSES {
        out.push_str(&render_reference(templates, class, reference_country));
        out.push('\n');
    }

    debug!(rendered, reference = REFERENCE_CLASSES.len(), "reactor blocks rendered");
    out
}

fn reactor_context(
    country: &str,
    type_label: &str,
    name: &str,
    capacity_mwe: f64,
    profile: &SpecProfile,
    position: Option<Coordinates>,
) -> Context {
    let (latitude, longitude, position_block) = match position {
        Some(p) => (
            p.latitude.to_string(),
            p.longitude.to_string(),
            format!(
                "      <latitude>{}</latitude>\n      <longitude>{}</longitude>",
                p.latitude, p.longitude
            ),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    Context::new()
        .with("country", country)
        .with("type", type_label)
        .with("reactor_name", name)
        .with("capacity", capacity_mwe)
        .with("assem_size", profile.assembly_size(capacity_mwe))
        .with("n_assem_core", profile.assemblies_per_core)
        .with("n_assem_batch", profile.assemblies_per_batch)
        .with("cycle_time", profile.cycle_time)
        .with("refuel_time", profile.refuel_time)
        .with("position", position_block)
        .with("latitude", latitude)
        .with("longitude", longitude)
}
