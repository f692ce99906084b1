//! Validation rules applied to an order before it is priced

use crate::error::{UnknownOptionError, ValidationError};
use crate::types::{OrderSpec, UnknownOptionPolicy};

/// Check the business pre-conditions of an order.
///
/// Only quantity and the color/printing pairing are checked here. Option
/// values outside the price tables are accepted; see [`check_options`].
pub fn validate(spec: &OrderSpec) -> Result<(), ValidationError> {
    if spec.quantity <= 0 {
        return Err(ValidationError::InvalidQuantity);
    }

    // Colors only make sense with a printing method, and a printing method needs colors
    let unprinted = spec.printing_method.is_none();
    if (spec.color_count == 0 && !unprinted) || (spec.color_count > 0 && unprinted) {
        return Err(ValidationError::ColorMethodMismatch);
    }

    Ok(())
}

/// Apply the unknown-option policy to an order.
///
/// Reports the first unrecognized field in request order: `type`,
/// `printing_method`, `hand_attachment`.
pub fn check_options(spec: &OrderSpec, policy: UnknownOptionPolicy) -> Result<(), UnknownOptionError> {
    if policy == UnknownOptionPolicy::PriceAsZero {
        return Ok(());
    }

    let unknown = if !spec.product_type.is_recognized() {
        Some(("type", spec.product_type.as_str()))
    } else if !spec.printing_method.is_recognized() {
        Some(("printing_method", spec.printing_method.as_str()))
    } else if !spec.hand_attachment.is_recognized() {
        Some(("hand_attachment", spec.hand_attachment.as_str()))
    } else {
        None
    };

    match unknown {
        Some((field, value)) => {
            tracing::debug!("Rejecting unrecognized {} value {:?}", field, value);
            Err(UnknownOptionError { field, value: value.to_string() })
        }
        None => Ok(()),
    }
}
