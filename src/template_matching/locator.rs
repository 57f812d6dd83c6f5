//! Threshold and coordinate translation on top of the matcher

use super::library::TemplateLibrary;
use super::matcher::TemplateMatcher;
use super::types::{ActionablePoint, Frame, MatchResult};
use crate::error::NavResult;
use std::sync::Arc;

/// Turns a logical template name into a clickable screen point
#[derive(Clone, Debug)]
pub struct Locator {
    library: Arc<TemplateLibrary>,
    matcher: TemplateMatcher,
}

impl Locator {
    pub fn new(library: Arc<TemplateLibrary>) -> Self {
        Self {
            library,
            matcher: TemplateMatcher::new(),
        }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    /// Raw best match for `template_name`, without any threshold
    ///
    /// An unknown name is a configuration error and is always returned as
    /// `TemplateNotFound`.
    pub fn inspect(&self, frame: &Frame, template_name: &str) -> NavResult<MatchResult> {
        let template = self.library.get(template_name)?;
        Ok(self.matcher.match_template(frame, &template))
    }

    /// Locate `template_name` in `frame`, accepting matches with `confidence >= threshold`
    ///
    /// Low confidence is a normal outcome during UI transitions and yields `Ok(None)`.
    pub fn locate(
        &self,
        frame: &Frame,
        template_name: &str,
        threshold: f32,
    ) -> NavResult<Option<ActionablePoint>> {
        Ok(self
            .locate_detailed(frame, template_name, threshold)?
            .0)
    }

    /// Like [`Locator::locate`], also returning the match it was derived from
    pub fn locate_detailed(
        &self,
        frame: &Frame,
        template_name: &str,
        threshold: f32,
    ) -> NavResult<(Option<ActionablePoint>, MatchResult)> {
        let result = self.inspect(frame, template_name)?;
        if !result.found || result.confidence < threshold {
            log::debug!(
                "👀 '{}' below threshold (best confidence: {:.3} < {:.3})",
                template_name,
                result.confidence,
                threshold
            );
            return Ok((None, result));
        }

        let point = result.actionable_point(frame.origin());
        log::debug!(
            "🎯 {} -> click target {:?}",
            result.describe(template_name),
            point
        );
        Ok((point, result))
    }
}
