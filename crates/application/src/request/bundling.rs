use ferrous_lookup_domain::{Extensions, RecordType, RETURN_BOTH_V4_AND_V6};

/// Second record type a lookup must carry, if any.
///
/// Only `return_both_v4_and_v6` on an A or AAAA lookup bundles: the request
/// then owns one sub-query per address family, requested type first.
pub fn bundled_complement(extensions: &Extensions, record_type: RecordType) -> Option<RecordType> {
    if !extensions.get_flag(RETURN_BOTH_V4_AND_V6) {
        return None;
    }
    record_type.address_complement()
}
