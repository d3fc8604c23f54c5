use gs_core::config::RenderOptions;
use gs_core::error::Result;
use gs_core::geometry::Feature;

use crate::grid::LINE_SEP;
use crate::render;
use crate::table::{format_table, select_properties};

/// Lazy sequence of pages, one per feature.
///
/// Each page is an optional attribute table followed by the rendering of
/// that feature alone.
pub struct Pages<I> {
    features: I,
    properties: Option<Vec<String>>,
    options: RenderOptions,
}

impl<I: Iterator<Item = Feature>> Pages<I> {
    fn page(&self, feature: Feature) -> Result<String> {
        let mut parts = Vec::with_capacity(2);
        if let Some(names) = &self.properties {
            parts.push(format_table(&select_properties(&feature.properties, names)?)?);
        }
        parts.push(render(feature.geometry, &self.options)?);
        Ok(parts.join(LINE_SEP) + LINE_SEP)
    }
}

impl<I: Iterator<Item = Feature>> Iterator for Pages<I> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let feature = self.features.next()?;
        Some(self.page(feature))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.features.size_hint()
    }
}

/// One page per feature, with the listed properties tabulated above it.
///
/// # Example
/// ```
/// use gs_ascii::paginate::paginate;
/// use gs_core::config::RenderOptions;
/// use gs_core::geometry::{Feature, Geometry};
///
/// let features = vec![
///     Feature::new(Geometry::rectangle(0.0, 0.0, 2.0, 2.0)).with_property("NAME", "square"),
/// ];
/// let opts = RenderOptions::default().with_width(2);
/// let pages: Vec<String> = paginate(features, Some(vec!["NAME".into()]), opts)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(pages[0], "\
/// +------+--------+
/// | NAME | square |
/// +------+--------+
/// + +
/// + +
///
/// ");
/// ```
pub fn paginate<I>(
    features: I,
    properties: Option<Vec<String>>,
    options: RenderOptions,
) -> Pages<I::IntoIter>
where
    I: IntoIterator<Item = Feature>,
{
    Pages {
        features: features.into_iter(),
        properties,
        options,
    }
}
