//! # Resources
//!
//! A [`Resource`] is one manifest document. Files routinely hold several
//! documents separated by `---`; [`Resource::split_stream`] cuts them
//! apart while remembering each document's position.

use std::fmt;

/// One Kubernetes manifest document under validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    path: String,
    index: usize,
    contents: String,
}

impl Resource {
    /// A single-document resource.
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            index: 0,
            contents: contents.into(),
        }
    }

    /// Split a multi-document YAML stream into resources.
    ///
    /// Documents are separated by lines starting with `---`. A node on the
    /// separator line (`--- {kind: Pod}`, `--- !!map`) opens the next
    /// document; anything else on the line is dropped. A leading separator
    /// does not produce an empty first document, but empty documents
    /// between separators are kept so that indexes match the stream.
    pub fn split_stream(path: &str, stream: &str) -> Vec<Resource> {
        let mut documents: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut seen_content = false;

        for line in stream.split_inclusive('\n') {
            if let Some(inline) = separator(line) {
                if seen_content || !documents.is_empty() {
                    documents.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                seen_content = true;
                if !inline.is_empty() {
                    current.push_str(inline);
                    current.push('\n');
                }
                continue;
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                seen_content = true;
            }
            current.push_str(line);
        }
        if seen_content || documents.is_empty() {
            documents.push(current);
        }

        documents
            .into_iter()
            .enumerate()
            .map(|(index, contents)| Resource {
                path: path.to_string(),
                index,
                contents,
            })
            .collect()
    }

    /// Source path, used for reporting.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Position of the document inside its stream, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw document text.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// The form the schema validator consumes.
    pub fn to_schema_resource(&self) -> kubecheck_schema::Resource<'_> {
        kubecheck_schema::Resource::new(&self.path, self.contents.as_bytes())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}#{}", self.path, self.index)
        }
    }
}

/// If `line` is a document separator, the node that follows it on the
/// same line (empty when there is none).
fn separator(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("---")?.trim_end();
    if rest.is_empty() {
        return Some("");
    }
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let inline = rest.trim_start();
    if inline.starts_with('#') {
        Some("")
    } else {
        Some(inline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_document() {
        let docs = Resource::split_stream("a.yaml", "kind: ConfigMap\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].index(), 0);
        assert_eq!(docs[0].contents(), "kind: ConfigMap\n");
    }

    #[test]
    fn multiple_documents_keep_order() {
        let stream = "kind: A\n---\nkind: B\n---\nkind: C\n";
        let docs = Resource::split_stream("a.yaml", stream);
        let kinds: Vec<&str> = docs.iter().map(|d| d.contents().trim()).collect();
        assert_eq!(kinds, ["kind: A", "kind: B", "kind: C"]);
        assert_eq!(docs[2].index(), 2);
        assert_eq!(docs[2].to_string(), "a.yaml#2");
    }

    #[test]
    fn leading_separator_does_not_create_document() {
        let docs = Resource::split_stream("a.yaml", "---\nkind: A\n---\nkind: B\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].contents(), "kind: A\n");
    }

    #[test]
    fn comment_before_leading_separator_is_dropped() {
        let docs = Resource::split_stream("a.yaml", "# header\n---\nkind: A\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].contents(), "kind: A\n");
    }

    #[test]
    fn empty_document_between_separators_is_kept() {
        let docs = Resource::split_stream("a.yaml", "kind: A\n---\n---\nkind: B\n");
        assert_eq!(docs.len(), 3);
        assert!(docs[1].contents().trim().is_empty());
    }

    #[test]
    fn separator_with_trailing_comment() {
        let docs = Resource::split_stream("a.yaml", "kind: A\n--- # next\nkind: B\n");
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn node_on_separator_line_opens_next_document() {
        let docs = Resource::split_stream("a.yaml", "kind: A\n--- {apiVersion: v1, kind: Pod}\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].contents(), "kind: A\n");
        assert_eq!(docs[1].contents(), "{apiVersion: v1, kind: Pod}\n");
    }

    #[test]
    fn tag_on_separator_line_is_kept() {
        let docs = Resource::split_stream("a.yaml", "--- !!map\nkind: Pod\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].contents(), "!!map\nkind: Pod\n");
    }

    #[test]
    fn triple_dash_inside_value_is_not_a_separator() {
        let docs = Resource::split_stream("a.yaml", "kind: A\nnote: \"---\"\n----x: 1\n");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn empty_stream_yields_one_empty_document() {
        let docs = Resource::split_stream("a.yaml", "");
        assert_eq!(docs.len(), 1);
        assert!(docs[0].contents().is_empty());
    }

    #[test]
    fn schema_resource_borrows_contents() {
        let resource = Resource::new("cm.yaml", "kind: ConfigMap\n");
        let view = resource.to_schema_resource();
        assert_eq!(view.path, "cm.yaml");
        assert_eq!(view.bytes, b"kind: ConfigMap\n");
    }
}
