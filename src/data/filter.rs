use super::model::{FilterSelection, Observation, ObservationTable};

// ---------------------------------------------------------------------------
// Row subsets used by the derived views
// ---------------------------------------------------------------------------

/// Which rows of the table a view is computed from.
///
/// * `Base`        – province and crop match exactly
/// * `ToDate`      – `Base` restricted to `year <= selection.year`
/// * `ExactYear`   – `Base` restricted to `year == selection.year`
/// * `CropYear`    – crop and year match exactly, any province
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    Base,
    ToDate,
    ExactYear,
    CropYear,
}

impl Subset {
    /// Whether a single observation belongs to this subset.
    pub fn matches(self, obs: &Observation, selection: &FilterSelection) -> bool {
        let same_crop = obs.crop == selection.crop;
        let same_province = obs.province == selection.province;
        match self {
            Subset::Base => same_province && same_crop,
            Subset::ToDate => same_province && same_crop && obs.year <= selection.year,
            Subset::ExactYear => same_province && same_crop && obs.year == selection.year,
            Subset::CropYear => same_crop && obs.year == selection.year,
        }
    }
}

/// Return the rows passing `subset`, in table order. Duplicate
/// (province, crop, year) rows are all kept.
pub fn select<'a>(
    table: &'a ObservationTable,
    selection: &FilterSelection,
    subset: Subset,
) -> Vec<&'a Observation> {
    table
        .observations()
        .iter()
        .filter(|obs| subset.matches(obs, selection))
        .collect()
}
