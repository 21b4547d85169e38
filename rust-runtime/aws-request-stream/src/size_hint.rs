/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// A body size hint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeHint {
    lower: u64,
    upper: Option<u64>,
}

impl SizeHint {
    /// Set an exact size hint with upper and lower set to `size` bytes.
    pub fn exact(size: u64) -> Self {
        Self {
            lower: size,
            upper: Some(size),
        }
    }

    /// Set the lower bound on the body size
    pub fn with_lower(self, lower: u64) -> Self {
        Self { lower, ..self }
    }

    /// Set the upper bound on the body size
    pub fn with_upper(self, upper: Option<u64>) -> Self {
        Self { upper, ..self }
    }

    /// Get the lower bound of the body size
    pub fn lower(&self) -> u64 {
        self.lower
    }

    /// Get the upper bound of the body size if known.
    pub fn upper(&self) -> Option<u64> {
        self.upper
    }

    /// Get the exact size of the body if the bounds agree.
    pub fn get_exact(&self) -> Option<u64> {
        self.upper.filter(|upper| *upper == self.lower)
    }
}

impl From<&SizeHint> for http_body::SizeHint {
    fn from(value: &SizeHint) -> Self {
        match value.get_exact() {
            Some(exact) => http_body::SizeHint::with_exact(exact),
            None => {
                let mut hint = http_body::SizeHint::new();
                hint.set_lower(value.lower);
                if let Some(upper) = value.upper {
                    hint.set_upper(upper);
                }
                hint
            }
        }
    }
}
