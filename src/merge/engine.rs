//! Method-level merge of freshly generated Java source with a customized copy.
//!
//! The generated file supplies the structure: package line, imports, fields,
//! class annotations, member order, and which members exist at all. For every
//! generated member whose signature also appears in the existing file, the
//! existing declaration (annotations and body included) replaces the generated
//! one. Members that only exist in the existing file are dropped.
//!
//! # Duplicate signatures
//!
//! When a signature occurs more than once on either side, occurrences are
//! paired in declaration order: the k-th generated occurrence takes the k-th
//! existing occurrence. Generated occurrences without a partner keep their
//! generated text. Each duplicated signature is reported as an
//! [`AmbiguousSignature`].

use std::collections::BTreeMap;
use std::fmt;

use jregen_java::{MemberDeclaration, ParseError, extract_members};

use super::splice::{SpliceEdit, apply_edits};

/// A signature that occurs more than once in the generated or existing file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousSignature {
    /// The duplicated signature text.
    pub signature: String,
    /// Occurrences in the generated file.
    pub generated: usize,
    /// Occurrences in the existing file.
    pub existing: usize,
}

impl fmt::Display for AmbiguousSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` declared {} time(s) in generated and {} time(s) in existing source; paired by declaration order",
            self.signature, self.generated, self.existing
        )
    }
}

/// Result of [`merge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged source text.
    pub text: String,
    /// Signatures whose existing declaration replaced the generated one,
    /// in generated document order.
    pub preserved: Vec<String>,
    /// Duplicate-signature warnings.
    pub ambiguous: Vec<AmbiguousSignature>,
}

impl MergeOutcome {
    fn verbatim(generated: &str) -> Self {
        Self {
            text: generated.to_owned(),
            preserved: Vec::new(),
            ambiguous: Vec::new(),
        }
    }
}

/// Merge `generated` with an optional `existing` customized version.
///
/// With no existing file the generated text is returned verbatim.
///
/// # Errors
/// Returns [`ParseError`] if either side fails to parse. The merge is never
/// attempted on a partial member list.
pub fn merge(generated: &str, existing: Option<&str>) -> Result<MergeOutcome, ParseError> {
    let Some(existing) = existing else {
        return Ok(MergeOutcome::verbatim(generated));
    };

    let generated_all = extract_members(generated)?;
    let existing_all = extract_members(existing)?;
    // Members of anonymous or local classes travel with their enclosing
    // declaration and never take part in pairing.
    let generated_members = outermost(&generated_all);
    let existing_members = outermost(&existing_all);

    let existing_index = index_by_signature(&existing_members);
    let ambiguous = find_ambiguities(&generated_members, &existing_index);
    for warning in &ambiguous {
        tracing::warn!(signature = %warning.signature, "{warning}");
    }

    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut edits = Vec::new();
    let mut preserved = Vec::new();

    for member in generated_members.iter().copied() {
        let signature = member.signature();
        let ordinal = seen.entry(signature.clone()).or_insert(0);
        let partner = existing_index
            .get(&signature)
            .and_then(|candidates| candidates.get(*ordinal));
        *ordinal += 1;

        if let Some(partner) = partner {
            edits.push(SpliceEdit::new(member.range.clone(), &partner.source_text));
            preserved.push(signature);
        }
    }

    tracing::debug!(
        generated = generated_members.len(),
        existing = existing_members.len(),
        preserved = preserved.len(),
        "merged member declarations"
    );

    Ok(MergeOutcome {
        text: apply_edits(generated, &edits),
        preserved,
        ambiguous,
    })
}

/// Convenience wrapper returning only the merged text.
///
/// # Errors
/// Same as [`merge`].
pub fn merge_sources(generated: &str, existing: Option<&str>) -> Result<String, ParseError> {
    merge(generated, existing).map(|outcome| outcome.text)
}

/// Members not contained in another member, in start-byte order.
fn outermost(members: &[MemberDeclaration]) -> Vec<&MemberDeclaration> {
    let mut sorted: Vec<&MemberDeclaration> = members.iter().collect();
    sorted.sort_by_key(|m| (m.start_byte(), std::cmp::Reverse(m.end_byte())));

    let mut out: Vec<&MemberDeclaration> = Vec::with_capacity(sorted.len());
    let mut enclosing_end = 0;
    for member in sorted {
        if !out.is_empty() && member.end_byte() <= enclosing_end {
            continue;
        }
        enclosing_end = member.end_byte();
        out.push(member);
    }
    out
}

fn index_by_signature<'a>(members: &[&'a MemberDeclaration]) -> BTreeMap<String, Vec<&'a MemberDeclaration>> {
    let mut index: BTreeMap<String, Vec<&MemberDeclaration>> = BTreeMap::new();
    for member in members.iter().copied() {
        index.entry(member.signature()).or_default().push(member);
    }
    index
}

fn find_ambiguities(
    generated: &[&MemberDeclaration],
    existing: &BTreeMap<String, Vec<&MemberDeclaration>>,
) -> Vec<AmbiguousSignature> {
    let mut generated_counts: BTreeMap<String, usize> = BTreeMap::new();
    for member in generated {
        *generated_counts.entry(member.signature()).or_insert(0) += 1;
    }

    let mut signatures: Vec<&String> = generated_counts.keys().collect();
    signatures.extend(existing.keys());
    signatures.sort();
    signatures.dedup();

    signatures
        .into_iter()
        .filter_map(|signature| {
            let generated = generated_counts.get(signature).copied().unwrap_or(0);
            let existing = existing.get(signature).map_or(0, Vec::len);
            (generated > 1 || existing > 1).then(|| AmbiguousSignature {
                signature: signature.clone(),
                generated,
                existing,
            })
        })
        .collect()
}
