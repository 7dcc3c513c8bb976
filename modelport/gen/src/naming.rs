//! Identifier and path helpers shared by every target stack.
//!
//! All functions are pure. Identifiers are validated against a permissive
//! allow-list (ASCII letters, digits, `_` and `-`) since the generated files
//! are plain text that this crate never compiles.

use heck::{ToKebabCase, ToUpperCamelCase};

use crate::errors::GeneratorError;

/// Per-target conventions for collection URLs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointStyle {
    /// Appended to the endpoint segment (e.g. `-list`).
    pub suffix: Option<String>,
    /// Whether the URL ends with `/`.
    pub trailing_slash: bool,
}

/// Checks that `identifier` is usable in every target language.
///
/// ## Errors
///
/// Returns `GeneratorError::InvalidIdentifier` for empty identifiers or
/// identifiers containing anything but ASCII alphanumerics, `_` and `-`.
pub fn validate_identifier(identifier: &str) -> Result<(), GeneratorError> {
    check_chars(identifier, |c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_endpoint(endpoint: &str) -> Result<(), GeneratorError> {
    check_chars(endpoint, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/')
    })
}

fn check_chars(identifier: &str, allowed: impl Fn(char) -> bool) -> Result<(), GeneratorError> {
    if identifier.is_empty() {
        return Err(GeneratorError::InvalidIdentifier {
            identifier: String::new(),
            reason: "identifier is empty".to_string(),
        });
    }
    if let Some(bad) = identifier.chars().find(|c| !allowed(*c)) {
        return Err(GeneratorError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: format!("character '{bad}' is not allowed"),
        });
    }
    Ok(())
}

/// Capitalizes each `_`/`-` separated segment and joins them.
///
/// ## Examples
///
/// ```
/// use modelport_gen::naming::title_case;
///
/// assert_eq!(title_case("blog").unwrap(), "Blog");
/// assert_eq!(title_case("how_it_works").unwrap(), "HowItWorks");
/// assert!(title_case("blog post").is_err());
/// ```
pub fn title_case(identifier: &str) -> Result<String, GeneratorError> {
    validate_identifier(identifier)?;
    Ok(identifier.to_upper_camel_case())
}

/// Class name of a model: `{App}{Model}`.
///
/// ```
/// use modelport_gen::naming::class_name;
///
/// assert_eq!(class_name("sample", "product").unwrap(), "SampleProduct");
/// ```
pub fn class_name(application_name: &str, model_name: &str) -> Result<String, GeneratorError> {
    Ok(format!(
        "{}{}",
        title_case(application_name)?,
        title_case(model_name)?
    ))
}

/// Kebab-cases an identifier for dashed file names.
///
/// ```
/// use modelport_gen::naming::dasherize;
///
/// assert_eq!(dasherize("how_it_works").unwrap(), "how-it-works");
/// ```
pub fn dasherize(identifier: &str) -> Result<String, GeneratorError> {
    validate_identifier(identifier)?;
    Ok(identifier.to_kebab_case())
}

/// Pluralizes with suffix rules only; irregular nouns are not handled.
///
/// ```
/// use modelport_gen::naming::pluralize;
///
/// assert_eq!(pluralize("product"), "products");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("box"), "boxes");
/// assert_eq!(pluralize("day"), "days");
/// ```
pub fn pluralize(identifier: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }

    if let Some(stem) = identifier.strip_suffix('y') {
        let after_vowel = stem
            .chars()
            .last()
            .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));
        if !stem.is_empty() && !after_vowel {
            return format!("{stem}ies");
        }
    }

    let sibilant = ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| identifier.ends_with(suffix));
    if sibilant {
        format!("{identifier}es")
    } else {
        format!("{identifier}s")
    }
}

/// Joins an API base and an endpoint segment into a collection URL.
///
/// Exactly one `/` separates the parts. The style's suffix is appended to
/// the endpoint segment and a trailing slash is added when the style asks
/// for one.
///
/// ## Examples
///
/// ```
/// use modelport_gen::naming::{endpoint_path, EndpointStyle};
///
/// let plain = EndpointStyle::default();
/// assert_eq!(endpoint_path("/api/", "/blog/posts", &plain).unwrap(), "/api/blog/posts");
///
/// let drf = EndpointStyle { suffix: None, trailing_slash: true };
/// assert_eq!(endpoint_path("/api", "blog/posts", &drf).unwrap(), "/api/blog/posts/");
/// ```
///
/// ## Errors
///
/// Returns `GeneratorError::InvalidIdentifier` when the endpoint contains
/// characters outside the allow-list.
pub fn endpoint_path(
    base_url: &str,
    endpoint: &str,
    style: &EndpointStyle,
) -> Result<String, GeneratorError> {
    let segment = endpoint.trim_matches('/');
    validate_endpoint(segment)?;

    let base = base_url.trim_end_matches('/');
    let mut path = if base.is_empty() {
        format!("/{segment}")
    } else {
        format!("{base}/{segment}")
    };
    if let Some(suffix) = &style.suffix {
        path.push_str(suffix);
    }
    if style.trailing_slash {
        path.push('/');
    }
    Ok(path)
}

/// Extracts placeholder names from a `{name}` pattern.
///
/// ## Examples
///
/// ```
/// use modelport_gen::naming::extract_placeholders;
///
/// assert_eq!(extract_placeholders("src/models.js"), Vec::<&str>::new());
/// assert_eq!(
///     extract_placeholders("app/models/{app_dash}/{model_dash}.js"),
///     vec!["app_dash", "model_dash"]
/// );
/// ```
pub fn extract_placeholders(pattern: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut start = None;

    for (idx, c) in pattern.char_indices() {
        if c == '{' {
            start = Some(idx + 1);
        } else if c == '}' {
            if let Some(from) = start.take() {
                let name = &pattern[from..idx];
                if !name.is_empty() {
                    names.push(name);
                }
            }
        }
    }

    names
}

/// Substitutes `{name}` placeholders with their values.
///
/// Placeholders without a value are left untouched.
///
/// ```
/// use modelport_gen::naming::substitute_placeholders;
///
/// let path =
///     substitute_placeholders("src/{app}/{model}.ts", &[("app", "blog"), ("model", "post")]);
/// assert_eq!(path, "src/blog/post.ts");
/// ```
pub fn substitute_placeholders(pattern: &str, values: &[(&str, &str)]) -> String {
    let mut result = pattern.to_string();
    for (name, value) in values {
        let placeholder = format!("{{{name}}}");
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_allow_dashes_and_underscores() {
        assert!(validate_identifier("how_it-works2").is_ok());
    }

    #[test]
    fn identifiers_reject_spaces_dots_and_empty() {
        for bad in ["", "blog post", "blog.post", "blög"] {
            let err = validate_identifier(bad).unwrap_err();
            assert!(
                matches!(err, GeneratorError::InvalidIdentifier { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn title_case_handles_segments() {
        assert_eq!(title_case("sample").unwrap(), "Sample");
        assert_eq!(title_case("how-it-works").unwrap(), "HowItWorks");
        assert_eq!(title_case("product2").unwrap(), "Product2");
    }

    #[test]
    fn class_name_rejects_invalid_parts() {
        assert!(class_name("blog", "post!").is_err());
        assert_eq!(class_name("blog", "post").unwrap(), "BlogPost");
    }

    #[test]
    fn pluralize_suffix_rules() {
        assert_eq!(pluralize("post"), "posts");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("wish"), "wishes");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("entry"), "entries");
        assert_eq!(pluralize("y"), "ys");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn endpoint_path_applies_suffix_before_slash() {
        let style = EndpointStyle {
            suffix: Some("-list".to_string()),
            trailing_slash: true,
        };
        assert_eq!(
            endpoint_path("https://example.com/api", "sample/products", &style).unwrap(),
            "https://example.com/api/sample/products-list/"
        );
    }

    #[test]
    fn endpoint_path_with_empty_base_is_rooted() {
        let style = EndpointStyle::default();
        assert_eq!(endpoint_path("", "products", &style).unwrap(), "/products");
    }

    #[test]
    fn endpoint_path_rejects_invalid_endpoint() {
        let style = EndpointStyle::default();
        assert!(endpoint_path("/api", "products?page=1", &style).is_err());
        assert!(endpoint_path("/api", "/", &style).is_err());
    }

    #[test]
    fn extract_consecutive_placeholders() {
        assert_eq!(extract_placeholders("{app}{model}.js"), vec!["app", "model"]);
    }

    #[test]
    fn extract_ignores_unbalanced_braces() {
        assert_eq!(extract_placeholders("src/}{app}/{"), vec!["app"]);
        assert_eq!(extract_placeholders("{}"), Vec::<&str>::new());
    }

    #[test]
    fn substitute_missing_placeholder_unchanged() {
        assert_eq!(
            substitute_placeholders("src/{app}/{model}.js", &[("app", "blog")]),
            "src/blog/{model}.js"
        );
    }
}
