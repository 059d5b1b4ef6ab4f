//! Palette shade names and the expressions that compute them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sentinel::PRIMARY_VARIABLE;

/// Ordinals of the derived palette shades. 6 is the base color itself.
pub const SHADE_INDICES: [u8; 9] = [1, 2, 3, 4, 5, 7, 8, 9, 10];

const PRIMARY_FAMILY: &str = "@primary";

static SHADE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)-(\d+)$").expect("valid shade name regex"));

/// True for derived shade variables such as `@primary-5` or `@blue-10`.
pub fn is_shade_name(name: &str) -> bool {
    SHADE_NAME.is_match(name)
}

/// Name of the shade variable probed for `variable` at `index`.
///
/// `@primary-color` shades are `@primary-N`; every other variable gets `-N`
/// appended.
pub fn shade_variable_name(variable: &str, index: u8) -> String {
    if variable == PRIMARY_VARIABLE {
        format!("{}-{}", PRIMARY_FAMILY, index)
    } else {
        format!("{}-{}", variable, index)
    }
}

/// Builds the runtime palette expression for a shade variable.
///
/// `@primary-5` becomes ``color(~`colorPalette("@{primary-color}", 5)`)``.
/// Returns `None` if `name` is not shaped `<base>-<digits>`.
pub fn shade_expression(name: &str) -> Option<String> {
    let caps = SHADE_NAME.captures(name)?;
    let base = if &caps[1] == PRIMARY_FAMILY {
        PRIMARY_VARIABLE
    } else {
        &caps[1]
    };
    let index = &caps[2];

    Some(format!(
        "color(~`colorPalette(\"@{{{}}}\", {})`)",
        base.trim_start_matches('@'),
        index
    ))
}
