//! Per-country deployment schedules and region wrappers.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, instrument};

use cyclusgen_shared::FleetUnit;
use cyclusgen_templates::{Context, TemplateSet};

/// Deployed units of one country, in fleet order.
#[derive(Debug, Clone)]
pub struct CountryGroup<'a> {
    pub country: &'a str,
    pub members: Vec<&'a FleetUnit>,
}

/// One line of a deployment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentEntry {
    pub prototype: String,
    pub entry_time: i32,
    pub number: u32,
    pub lifetime: i32,
}

impl DeploymentEntry {
    /// A single historical unit.
    pub fn for_unit(unit: &FleetUnit) -> Self {
        Self {
            prototype: unit.record.name.clone(),
            entry_time: unit.lifecycle.entry_time,
            number: 1,
            lifetime: unit.lifecycle.lifetime,
        }
    }
}

/// Group deployed units by country, in the order of `countries`.
///
/// Countries with no deployed unit are left out. A country listed more than
/// once yields one group, at its first position.
pub fn group_by_country<'a>(units: &'a [FleetUnit], countries: &'a [String]) -> Vec<CountryGroup<'a>> {
    let mut seen: HashSet<&str> = HashSet::new();
    countries
        .iter()
        .filter(|country| seen.insert(country.as_str()))
        .filter_map(|country| {
            let members: Vec<&FleetUnit> = units
                .iter()
                .filter(|u| u.record.country == *country && u.lifecycle.is_deployed())
                .collect();
            if members.is_empty() {
                debug!(%country, "no deployed units, region omitted");
                None
            } else {
                Some(CountryGroup {
                    country: country.as_str(),
                    members,
                })
            }
        })
        .collect()
}

/// Render a deployment schedule through the `deployinst` template.
pub fn render_deployinst(templates: &TemplateSet, entries: &[DeploymentEntry]) -> String {
    let mut prototypes = String::new();
    let mut start_times = String::new();
    let mut numbers = String::new();
    let mut lifetimes = String::new();

    for entry in entries {
        push_val(&mut prototypes, &entry.prototype);
        push_val(&mut start_times, entry.entry_time);
        push_val(&mut numbers, entry.number);
        push_val(&mut lifetimes, entry.lifetime);
    }

    let ctx = Context::new()
        .with("prototype", prototypes)
        .with("start_time", start_times)
        .with("number", numbers)
        .with("lifetime", lifetimes);
    templates.deployinst.render(&ctx)
}

fn push_val(buf: &mut String, value: impl std::fmt::Display) {
    // Writing to a String cannot fail.
    let _ = writeln!(buf, "    <val>{value}</val>");
}

/// Region blocks for every country with deployed units, each followed by a
/// newline.
#[instrument(skip_all, fields(countries = countries.len()))]
pub fn render_regions(templates: &TemplateSet, units: &[FleetUnit], countries: &[String]) -> String {
    let groups = group_by_country(units, countries);
    let mut out = String::new();

    for group in &groups {
        let entries: Vec<DeploymentEntry> =
            group.members.iter().map(|u| DeploymentEntry::for_unit(u)).collect();
        let ctx = Context::new()
            .with("country", group.country)
            .with("country_gov", format!("{}_government", group.country))
            .with("deployinst", render_deployinst(templates, &entries));
        out.push_str(&templates.region.render(&ctx));
        out.push('\n');
        debug!(country = group.country, units = entries.len(), "region rendered");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cyclusgen_shared::{Lifecycle, ReactorRecord, SpecialModes};
    use cyclusgen_templates::Template;

    fn unit(country: &str, name: &str, entry_time: i32, lifetime: i32) -> FleetUnit {
        FleetUnit {
            record: ReactorRecord {
                country: country.into(),
                name: name.into(),
                reactor_type: "PWR".into(),
                net_capacity_mwe: 900.0,
                commercial: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
                shutdown: None,
                position: None,
            },
            lifecycle: Lifecycle {
                entry_time,
                lifetime,
            },
        }
    }

    fn countries(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_follow_requested_order() {
        let units = vec![
            unit("France", "GRAVELINES-1", 1, 300),
            unit("Belgium", "DOEL-1", 1, 61),
            unit("France", "CHOOZ B-1", 1, 500),
        ];
        let wanted = countries(&["France", "Belgium"]);
        let groups = group_by_country(&units, &wanted);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].country, "France");
        let names: Vec<&str> = groups[0].members.iter().map(|u| u.record.name.as_str()).collect();
        assert_eq!(names, vec!["GRAVELINES-1", "CHOOZ B-1"]);
        assert_eq!(groups[1].country, "Belgium");
    }

    #[test]
    fn countries_without_deployed_units_are_omitted() {
        let units = vec![unit("Belgium", "DOEL-1", 1, 61), unit("Netherlands", "GONE", 1, 0)];
        let wanted = countries(&["Netherlands", "Belgium", "Italy"]);
        let groups = group_by_country(&units, &wanted);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].country, "Belgium");
    }

    #[test]
    fn repeated_country_yields_one_group() {
        let units = vec![unit("Belgium", "DOEL-1", 1, 61), unit("France", "CHINON", 5, 40)];
        let wanted = countries(&["France", "Belgium", "France", "Belgium"]);
        let groups = group_by_country(&units, &wanted);

        let order: Vec<&str> = groups.iter().map(|g| g.country).collect();
        assert_eq!(order, vec!["France", "Belgium"]);
        assert_eq!(groups[1].members.len(), 1);
    }

    #[test]
    fn repeated_country_renders_one_region() {
        let templates = TemplateSet::builtin(&SpecialModes::default());
        let units = vec![unit("Belgium", "DOEL-1", 1, 61)];
        let out = render_regions(&templates, &units, &countries(&["Belgium", "Belgium"]));

        assert_eq!(out.matches("<name>Belgium_government</name>").count(), 1);
        assert_eq!(out.matches("<val>DOEL-1</val>").count(), 1);
    }

    #[test]
    fn deployinst_lists_one_val_per_entry() {
        let templates = TemplateSet::builtin(&SpecialModes::default());
        let entries = vec![
            DeploymentEntry {
                prototype: "DOEL-1".into(),
                entry_time: 1,
                number: 1,
                lifetime: 61,
            },
            DeploymentEntry {
                prototype: "TIHANGE-1".into(),
                entry_time: 12,
                number: 2,
                lifetime: 300,
            },
        ];
        let out = render_deployinst(&templates, &entries);

        assert!(out.contains("  <prototypes>\n    <val>DOEL-1</val>\n    <val>TIHANGE-1</val>\n  </prototypes>"));
        assert!(out.contains("  <build_times>\n    <val>1</val>\n    <val>12</val>\n  </build_times>"));
        assert!(out.contains("  <n_build>\n    <val>1</val>\n    <val>2</val>\n  </n_build>"));
        assert!(out.contains("  <lifetimes>\n    <val>61</val>\n    <val>300</val>\n  </lifetimes>"));
    }

    #[test]
    fn region_names_government_institution() {
        let mut templates = TemplateSet::builtin(&SpecialModes::default());
        templates.region = Template::new("region.xml", "[{{ country }}|{{ country_gov }}]");

        let units = vec![unit("Belgium", "DOEL-1", 1, 61), unit("France", "CHINON", 5, 40)];
        let out = render_regions(&templates, &units, &countries(&["Belgium", "France"]));

        assert_eq!(out, "[Belgium|Belgium_government]\n[France|France_government]\n");
    }

    #[test]
    fn builtin_region_embeds_schedule() {
        let templates = TemplateSet::builtin(&SpecialModes::default());
        let units = vec![unit("Belgium", "DOEL-1", 1, 61)];
        let out = render_regions(&templates, &units, &countries(&["Belgium"]));

        assert!(out.contains("<name>Belgium</name>"));
        assert!(out.contains("<name>Belgium_government</name>"));
        assert!(out.contains("<DeployInst>"));
        assert!(out.contains("<val>DOEL-1</val>"));
    }

    #[test]
    fn no_units_renders_nothing() {
        let templates = TemplateSet::builtin(&SpecialModes::default());
        assert!(render_regions(&templates, &[], &countries(&["Belgium"])).is_empty());
    }
}
