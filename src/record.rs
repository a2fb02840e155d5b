//! Template and mask pairs as handed to persistence.

use crate::encode::IrisTemplate;
use crate::mask::IrisMask;
use crate::util::{IrisError, IrisResult};

/// One enrolled (or live) iris: a template and the mask it was built with.
///
/// Construction checks that both fields describe the same normalized
/// geometry, so a record read back from storage is either consistent or
/// rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RecordParts"))]
pub struct EnrollmentRecord {
    template: IrisTemplate,
    mask: IrisMask,
}

impl EnrollmentRecord {
    /// Pairs a template with its mask.
    pub fn new(template: IrisTemplate, mask: IrisMask) -> IrisResult<Self> {
        template.validate()?;
        mask.validate()?;
        if template.radial_resolution() != mask.radial_resolution()
            || template.angular_resolution() != mask.angular_resolution()
        {
            return Err(IrisError::RecordMismatch {
                reason: "template and mask resolutions differ",
            });
        }
        Ok(Self { template, mask })
    }

    pub fn template(&self) -> &IrisTemplate {
        &self.template
    }

    pub fn mask(&self) -> &IrisMask {
        &self.mask
    }

    /// Splits the record back into its parts.
    pub fn into_parts(self) -> (IrisTemplate, IrisMask) {
        (self.template, self.mask)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RecordParts {
    template: IrisTemplate,
    mask: IrisMask,
}

#[cfg(feature = "serde")]
impl TryFrom<RecordParts> for EnrollmentRecord {
    type Error = IrisError;

    fn try_from(parts: RecordParts) -> IrisResult<Self> {
        Self::new(parts.template, parts.mask)
    }
}
