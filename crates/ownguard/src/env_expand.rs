//! Environment variable expansion for configuration files.
//!
//! - `${VAR}` is replaced with the value of VAR and fails when VAR is unset.
//! - `${VAR:-default}` falls back to `default` when VAR is unset or empty.
//!
//! A `$` not followed by `{` is kept as is.

use std::borrow::Cow;

use anyhow::{Result, bail};

/// Expand references against the process environment.
pub fn expand_env_vars(text: &str) -> Result<Cow<'_, str>> {
    expand_with(text, |name| std::env::var(name).ok())
}

/// Expand references using `lookup` to resolve variable names.
pub fn expand_with<F>(text: &str, lookup: F) -> Result<Cow<'_, str>>
where
    F: Fn(&str) -> Option<String>,
{
    if !text.contains("${") {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body_start = start + 2;
        let Some(len) = rest[body_start..].find('}') else {
            let preview: String = rest[body_start..].chars().take(20).collect();
            bail!(
                "unclosed environment variable reference at byte {}: ${{{preview}...",
                text.len() - rest.len() + start
            );
        };
        let body = &rest[body_start..body_start + len];
        out.push_str(&resolve(body, &lookup)?);
        rest = &rest[body_start + len + 1..];
    }
    out.push_str(rest);

    Ok(Cow::Owned(out))
}

fn resolve<F>(body: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match body.split_once(":-") {
        Some((name, default)) => {
            validate_name(name)?;
            Ok(lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string()))
        }
        None => {
            validate_name(body)?;
            match lookup(body) {
                Some(value) => Ok(value),
                None => bail!(
                    "environment variable '{body}' is not set; \
                     use ${{{body}:-default}} to provide a fallback"
                ),
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        bail!("empty environment variable name in ${{}}");
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        bail!("invalid environment variable name '{name}': must start with a letter or underscore");
    }
    if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        bail!("invalid environment variable name '{name}': contains invalid character '{bad}'");
    }
    Ok(())
}
