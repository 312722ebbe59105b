//! Instruction prefixing for corpus and query records.

use super::record::RecordSet;

/// Prepend `instruction` to the `text` of every record in `records`.
///
/// The records are rewritten in place and the original text is not kept.
/// An empty instruction leaves the set untouched. Not idempotent: applying
/// the same instruction twice prefixes twice, so `RetrievalDataset` applies
/// it exactly once per materialization.
pub fn add_instruction(mut records: RecordSet, instruction: &str) -> RecordSet {
    if instruction.is_empty() {
        return records;
    }

    for record in records.iter_mut() {
        record.text.insert_str(0, instruction);
    }
    records
}
