//! Parameter Sets

use crate::pbrt::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

/// Stores the values of a single named parameter and whether it has been
/// read.
#[derive(Clone, Debug)]
pub struct ParamSetItem<T> {
    /// The values.
    pub values: Vec<T>,

    /// Set once a lookup has read the item.
    looked_up: Cell<bool>,
}

impl<T> ParamSetItem<T> {
    /// Returns a new `ParamSetItem`.
    ///
    /// * `values` - The values.
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            looked_up: Cell::new(false),
        }
    }
}

/// A hashmap of parameter sets stored by name.
pub type ParamSetMap<T> = HashMap<String, ParamSetItem<T>>;

/// Stores named configuration values of different types.
#[derive(Clone, Debug, Default)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<i64>,
    pub floats: ParamSetMap<Float>,
    pub strings: ParamSetMap<String>,
}

/// Define a macro that can be used to generate a function for adding/replacing
/// parameter set item.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&mut self, name: &str, values: &[$t]) {
            self.$paramset
                .insert(String::from(name), ParamSetItem::new(values.to_vec()));
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a single item.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$paramset.get(name) {
                Some(param) if param.values.len() == 1 => {
                    param.looked_up.set(true);
                    param.values[0].clone()
                }
                _ => default,
            }
        }
    };
}

/// Define a macro that collects the names of items nobody has read.
macro_rules! unused_names {
    ($names: ident, $paramset: expr) => {
        for (name, param) in $paramset.iter() {
            if !param.looked_up.get() {
                $names.push(name.clone());
            }
        }
    };
}

impl ParamSet {
    /// Returns a new `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_find_one!(find_one_bool, bool, bools);
    paramset_add!(add_bool, bool, bools);

    paramset_find_one!(find_one_int, i64, ints);
    paramset_add!(add_int, i64, ints);

    paramset_find_one!(find_one_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_find_one!(find_one_string, String, strings);
    paramset_add!(add_string, String, strings);

    /// Parses a `name=value` assignment and stores it under the type its
    /// value parses as: bool, then integer, then float, then string.
    ///
    /// * `assignment` - The `name=value` text.
    pub fn add_assignment(&mut self, assignment: &str) -> Result<(), String> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("Expected name=value, got '{}'", assignment))?;
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() {
            return Err(format!("Missing parameter name in '{}'", assignment));
        }

        if let Ok(b) = value.parse::<bool>() {
            self.add_bool(name, &[b]);
        } else if let Ok(i) = value.parse::<i64>() {
            self.add_int(name, &[i]);
        } else if let Ok(f) = value.parse::<Float>() {
            self.add_float(name, &[f]);
        } else {
            self.add_string(name, &[String::from(value)]);
        }
        Ok(())
    }

    /// Returns a float parameter; integer values are accepted too.
    ///
    /// * `name`    - Parameter name.
    /// * `default` - Value used when the parameter is absent.
    pub fn find_one_number(&self, name: &str, default: Float) -> Float {
        match self.ints.get(name) {
            Some(param) if param.values.len() == 1 => {
                param.looked_up.set(true);
                param.values[0] as Float
            }
            _ => self.find_one_float(name, default),
        }
    }

    /// Returns names of parameters that were never looked up.
    pub fn unused(&self) -> Vec<String> {
        let mut names = vec![];
        unused_names!(names, self.bools);
        unused_names!(names, self.ints);
        unused_names!(names, self.floats);
        unused_names!(names, self.strings);
        names.sort();
        names
    }

    /// Logs a warning for every parameter that was never looked up.
    pub fn report_unused(&self) {
        for name in self.unused() {
            warn!("Parameter '{}' not used", name);
        }
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec![];
        for (name, p) in self.bools.iter() {
            lines.push(format!("\"bool {}\" {:?}", name, p.values));
        }
        for (name, p) in self.ints.iter() {
            lines.push(format!("\"integer {}\" {:?}", name, p.values));
        }
        for (name, p) in self.floats.iter() {
            lines.push(format!("\"float {}\" {:?}", name, p.values));
        }
        for (name, p) in self.strings.iter() {
            lines.push(format!("\"string {}\" {:?}", name, p.values));
        }
        lines.sort();
        write!(f, "{}", lines.join("\n"))
    }
}
