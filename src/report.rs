//! Rendering of the final report.

use std::io::{self, Write};

use crate::aggregate::Aggregate;

/// Writes the two report sections in their fixed order. Purely
/// serialization: nothing is recomputed here, and both sections come out in
/// the aggregate's first-seen order.
pub fn write_report<W: Write>(writer: &mut W, aggregate: &Aggregate) -> io::Result<()> {
    writeln!(writer, "Tag Counts:")?;
    writeln!(writer, "Tag,Count")?;
    for (tag, count) in aggregate.tag_counts() {
        writeln!(writer, "{tag},{count}")?;
    }

    writeln!(writer)?;
    writeln!(writer, "Port/Protocol Combination Counts:")?;
    writeln!(writer, "Port,Protocol,Count")?;
    for (key, count) in aggregate.pair_counts() {
        writeln!(writer, "{},{},{}", key.port, key.protocol, count)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use similar_asserts::assert_eq;

    use super::*;
    use crate::{enrichment::LookupTable, flow::FlowKey};

    fn render(aggregate: &Aggregate) -> String {
        let mut out = Vec::new();
        write_report(&mut out, aggregate).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_both_sections() {
        let entries: HashMap<FlowKey, String> = [
            (FlowKey::new(25, "tcp"), "sv_P1".to_string()),
            (FlowKey::new(68, "udp"), "sv_P2".to_string()),
        ]
        .into_iter()
        .collect();
        let table = LookupTable::new(entries);

        let mut aggregate = Aggregate::new();
        for key in [
            FlowKey::new(25, "tcp"),
            FlowKey::new(68, "udp"),
            FlowKey::new(68, "udp"),
            FlowKey::new(99, "tcp"),
        ] {
            aggregate.record(key, &table);
        }

        assert_eq!(
            render(&aggregate),
            "Tag Counts:\n\
             Tag,Count\n\
             Untagged,1\n\
             sv_P1,1\n\
             sv_P2,2\n\
             \n\
             Port/Protocol Combination Counts:\n\
             Port,Protocol,Count\n\
             25,tcp,1\n\
             68,udp,2\n\
             99,tcp,1\n"
        );
    }

    #[test]
    fn empty_scan_still_lists_the_sentinel() {
        let aggregate = Aggregate::new();

        assert_eq!(
            render(&aggregate),
            "Tag Counts:\n\
             Tag,Count\n\
             Untagged,0\n\
             \n\
             Port/Protocol Combination Counts:\n\
             Port,Protocol,Count\n"
        );
    }
}
