//! Explicit WGSL composition.
//!
//! A [`ShaderTemplate`] is a complete WGSL source containing insertion
//! points, written as lines of the form `// @insert <name>`. A
//! [`ShaderComposer`] collects named fragments for one template and
//! resolves them once at startup. Every insertion point must be either
//! filled or explicitly skipped; anything else is a [`ShaderComposeError`].
//!
//! No global shader chunk is patched: each program gets its own composed
//! source built from the modules passed to it.

use std::collections::BTreeMap;
use std::fmt;

use bevy::render::render_resource::Shader;

const MARKER: &str = "// @insert ";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderComposeError {
    /// A fragment targeted a point the template does not declare.
    UnknownInsertionPoint { template: String, point: String },
    /// The template declares a point nobody filled or skipped.
    UnfilledInsertionPoint { template: String, point: String },
    /// A module was built from settings it cannot express.
    InvalidModule { module: String, reason: String },
}

impl fmt::Display for ShaderComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderComposeError::UnknownInsertionPoint { template, point } => {
                write!(f, "Shader '{template}' has no insertion point '{point}'")
            }
            ShaderComposeError::UnfilledInsertionPoint { template, point } => {
                write!(f, "Shader '{template}': insertion point '{point}' was never filled")
            }
            ShaderComposeError::InvalidModule { module, reason } => {
                write!(f, "Shader module '{module}' is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for ShaderComposeError {}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ShaderTemplate {
    name: String,
    source: String,
}

fn marker_name(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix(MARKER)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

impl ShaderTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared insertion points in source order, without duplicates.
    pub fn insertion_points(&self) -> Vec<&str> {
        let mut points: Vec<&str> = Vec::new();
        for name in self.source.lines().filter_map(marker_name) {
            if !points.contains(&name) {
                points.push(name);
            }
        }
        points
    }

    pub fn has_insertion_point(&self, point: &str) -> bool {
        self.source.lines().filter_map(marker_name).any(|n| n == point)
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ShaderComposer<'a> {
    template: &'a ShaderTemplate,
    /// `None` marks a point that was explicitly skipped.
    fragments: BTreeMap<String, Option<Vec<String>>>,
}

impl<'a> ShaderComposer<'a> {
    pub fn new(template: &'a ShaderTemplate) -> Self {
        Self {
            template,
            fragments: BTreeMap::new(),
        }
    }

    fn check_point(&self, point: &str) -> Result<(), ShaderComposeError> {
        if self.template.has_insertion_point(point) {
            Ok(())
        } else {
            Err(ShaderComposeError::UnknownInsertionPoint {
                template: self.template.name.clone(),
                point: point.to_string(),
            })
        }
    }

    /// Append a fragment at `point`. Fragments at the same point keep
    /// insertion order.
    pub fn insert(
        &mut self,
        point: &str,
        fragment: impl Into<String>,
    ) -> Result<&mut Self, ShaderComposeError> {
        self.check_point(point)?;
        let entry = self
            .fragments
            .entry(point.to_string())
            .or_insert_with(|| Some(Vec::new()));
        match entry {
            Some(list) => list.push(fragment.into()),
            None => *entry = Some(vec![fragment.into()]),
        }
        Ok(self)
    }

    /// Leave `point` empty on purpose.
    pub fn skip(&mut self, point: &str) -> Result<&mut Self, ShaderComposeError> {
        self.check_point(point)?;
        self.fragments.entry(point.to_string()).or_insert(None);
        Ok(self)
    }

    pub fn compose(&self) -> Result<ComposedShader, ShaderComposeError> {
        let mut out = String::with_capacity(self.template.source.len() * 2);
        for line in self.template.source.lines() {
            match marker_name(line) {
                Some(point) => match self.fragments.get(point) {
                    Some(Some(fragments)) => {
                        for fragment in fragments {
                            out.push_str(fragment.trim_end());
                            out.push('\n');
                        }
                    }
                    Some(None) => {}
                    None => {
                        return Err(ShaderComposeError::UnfilledInsertionPoint {
                            template: self.template.name.clone(),
                            point: point.to_string(),
                        })
                    }
                },
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        Ok(ComposedShader {
            name: self.template.name.clone(),
            source: out,
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Final WGSL for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedShader {
    pub name: String,
    pub source: String,
}

impl ComposedShader {
    /// Asset path the composed source is registered under.
    pub fn path(&self) -> String {
        format!("canopy/{}.wgsl", self.name)
    }

    pub fn into_shader(self) -> Shader {
        let path = self.path();
        Shader::from_wgsl(self.source, path)
    }
}
