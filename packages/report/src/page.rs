//! The interactive aggregator page.
//!
//! One HTML document with quarter and category selectors, a color legend
//! and a box per city. The spending, percentage, scale and artifact tables
//! are embedded as JavaScript constants; switching the selection recolors
//! the boxes and swaps each iframe to the matching artifact without a
//! reload.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use spendmap_spending_models::{ArtifactIndex, PercentageTable, ScaleRanges, SpendingTable};

use crate::ReportError;
use crate::paths::{ensure_dir, page_path};
use crate::template::{escape_html, fill, script_json};

const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");
const PAGE_SCRIPT: &str = include_str!("../templates/page.js");

/// A city as shown on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCity {
    /// Name used to look the city up in the data tables.
    pub name: String,
    /// Index used in element ids and artifact paths.
    pub index: usize,
}

/// Everything embedded in the page.
#[derive(Debug, Clone, Copy)]
pub struct PageData<'a> {
    /// Page heading and document title.
    pub title: &'a str,
    /// Quarter selector options, in display order.
    pub quarters: &'a [String],
    /// Category selector options, in display order.
    pub categories: &'a [String],
    /// One box per city.
    pub cities: &'a [PageCity],
    /// Embedded as `spendingData`.
    pub spending: &'a SpendingTable,
    /// Embedded as `percentageData`.
    pub percentages: &'a PercentageTable,
    /// Embedded as `scaleRanges`.
    pub scale_ranges: &'a ScaleRanges,
    /// Embedded as `mapFiles`.
    pub artifacts: &'a ArtifactIndex,
}

/// Renders the page document.
///
/// # Errors
///
/// Returns [`ReportError::Json`] if a table fails to serialize.
pub fn render_page(data: &PageData<'_>) -> Result<String, ReportError> {
    let title = escape_html(data.title);
    let quarter_options = options(data.quarters);
    let category_options = options(data.categories);
    let city_boxes = city_boxes(data.cities);

    let spending = script_json(data.spending, true)?;
    let percentages = script_json(data.percentages, true)?;
    let scale_ranges = script_json(data.scale_ranges, true)?;
    let artifacts = script_json(data.artifacts, true)?;

    let names: Vec<&str> = data.cities.iter().map(|c| c.name.as_str()).collect();
    let indices: Vec<usize> = data.cities.iter().map(|c| c.index).collect();
    let names = script_json(&names, false)?;
    let indices = script_json(&indices, false)?;

    Ok(fill(
        PAGE_TEMPLATE,
        &[
            ("TITLE", title.as_str()),
            ("QUARTER_OPTIONS", quarter_options.as_str()),
            ("CATEGORY_OPTIONS", category_options.as_str()),
            ("CITY_BOXES", city_boxes.as_str()),
            ("SPENDING_DATA", spending.as_str()),
            ("PERCENTAGE_DATA", percentages.as_str()),
            ("SCALE_RANGES", scale_ranges.as_str()),
            ("MAP_FILES", artifacts.as_str()),
            ("CITY_NAMES", names.as_str()),
            ("CITY_INDICES", indices.as_str()),
            ("PAGE_SCRIPT", PAGE_SCRIPT),
        ],
    ))
}

/// Renders the page and writes it into `out_dir`.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn write_page(out_dir: &Path, data: &PageData<'_>) -> Result<PathBuf, ReportError> {
    let html = render_page(data)?;
    ensure_dir(out_dir)?;
    let path = page_path(out_dir);
    std::fs::write(&path, html)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

fn options(values: &[String]) -> String {
    let mut out = String::new();
    for value in values {
        let value = escape_html(value);
        let _ = writeln!(out, "            <option value=\"{value}\">{value}</option>");
    }
    out
}

fn city_boxes(cities: &[PageCity]) -> String {
    let mut out = String::new();
    for city in cities {
        let name = escape_html(&city.name);
        let idx = city.index;
        let _ = write!(
            out,
            r#"    <div class="map-box">
        <h3>{name}</h3>
        <div id="spending-{idx}" class="spending-info">Loading...</div>
        <iframe id="map-{idx}" class="loading" title="{name}"></iframe>
    </div>
"#
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use spendmap_spending_models::ScaleBounds;

    use super::*;

    struct Fixture {
        quarters: Vec<String>,
        categories: Vec<String>,
        cities: Vec<PageCity>,
        spending: SpendingTable,
        percentages: PercentageTable,
        scale_ranges: ScaleRanges,
        artifacts: ArtifactIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let quarters = vec!["All Time".to_string(), "2014-Q4".to_string()];
            let categories = vec!["All Categories".to_string(), "Food & Drink".to_string()];
            let cities = vec![
                PageCity {
                    name: "Delhi".to_string(),
                    index: 0,
                },
                PageCity {
                    name: "<Mumbai>".to_string(),
                    index: 1,
                },
            ];

            let mut spending = SpendingTable::new();
            let mut percentages = PercentageTable::new();
            let mut scale_ranges = ScaleRanges::new();
            let mut artifacts = ArtifactIndex::new();
            for q in &quarters {
                for c in &categories {
                    let cities_spend: BTreeMap<String, f64> =
                        [("Delhi".to_string(), 1234.5), ("<Mumbai>".to_string(), 10.0)].into();
                    spending.entry(q.clone()).or_default().insert(c.clone(), cities_spend);
                    let cities_pct: BTreeMap<String, f64> =
                        [("Delhi".to_string(), 60.0), ("<Mumbai>".to_string(), 40.0)].into();
                    percentages.entry(q.clone()).or_default().insert(c.clone(), cities_pct);
                    scale_ranges
                        .entry(q.clone())
                        .or_default()
                        .insert(c.clone(), ScaleBounds { min: 40.0, max: 60.0 });
                    let paths: BTreeMap<usize, String> =
                        [(0, format!("citymaps/{q}-{c}-0.html"))].into();
                    artifacts.entry(q.clone()).or_default().insert(c.clone(), paths);
                }
            }

            Self {
                quarters,
                categories,
                cities,
                spending,
                percentages,
                scale_ranges,
                artifacts,
            }
        }

        fn data(&self) -> PageData<'_> {
            PageData {
                title: "Spending <2014>",
                quarters: &self.quarters,
                categories: &self.categories,
                cities: &self.cities,
                spending: &self.spending,
                percentages: &self.percentages,
                scale_ranges: &self.scale_ranges,
                artifacts: &self.artifacts,
            }
        }
    }

    #[test]
    fn one_option_per_quarter_and_category() {
        let fixture = Fixture::new();
        let html = render_page(&fixture.data()).unwrap();

        assert_eq!(html.matches("<option ").count(), 4);
        assert!(html.contains("<option value=\"All Time\">All Time</option>"));
        assert!(html.contains("<option value=\"2014-Q4\">2014-Q4</option>"));
        assert!(html.contains("<option value=\"Food &amp; Drink\">Food &amp; Drink</option>"));
    }

    #[test]
    fn one_box_per_city() {
        let fixture = Fixture::new();
        let html = render_page(&fixture.data()).unwrap();

        assert_eq!(html.matches("class=\"map-box\"").count(), 2);
        assert!(html.contains("id=\"spending-0\""));
        assert!(html.contains("id=\"map-1\""));
        assert!(html.contains("<h3>&lt;Mumbai&gt;</h3>"));
        assert!(!html.contains("<h3><Mumbai></h3>"));
        assert!(html.contains("<title>Spending &lt;2014&gt;</title>"));
    }

    #[test]
    fn embeds_all_tables() {
        let fixture = Fixture::new();
        let html = render_page(&fixture.data()).unwrap();

        assert!(html.contains("const spendingData = {"));
        assert!(html.contains("1234.5"));
        assert!(html.contains("const percentageData = {"));
        assert!(html.contains("\"min\": 40.0"));
        assert!(html.contains("citymaps/2014-Q4-All Categories-0.html"));
        assert!(html.contains("const cityNames = [\"Delhi\",\"<Mumbai>\"];"));
        assert!(html.contains("const cityIndices = [0,1];"));
        assert!(html.contains("function getHeatmapColor"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn page_script_uses_the_server_gradient() {
        // Same segments, breakpoints and rounding as `color::heatmap_color`.
        for expr in [
            "t = (value - minValue) / (maxValue - minValue);",
            "if (t < 0.25) {",
            "} else if (t < 0.5) {",
            "} else if (t < 0.75) {",
            "g = 200 + 800 * t;",
            "b = 200;",
            "b = 800 * (0.5 - t);",
            "r = 800 * (t - 0.5);",
            "g = 800 * (1 - t);",
            "return Math.min(255, Math.max(0, Math.floor(v)));",
            "if (maxValue === minValue || !Number.isFinite(value)) {",
            "t = 0.5;",
        ] {
            assert!(PAGE_SCRIPT.contains(expr), "page.js is missing `{expr}`");
        }
        assert!(!PAGE_SCRIPT.contains("Math.round"));
    }

    #[test]
    fn writes_into_output_dir() {
        let dir = std::env::temp_dir().join("spendmap_report_page_test");
        let _ = std::fs::remove_dir_all(&dir);

        let fixture = Fixture::new();
        let path = write_page(&dir, &fixture.data()).unwrap();

        assert_eq!(path, dir.join("map_visualization.html"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
