//! C rule-taxonomy generator.
//!
//! Emits a header/source pair enumerating every rule type the simulator
//! accepts, for consumption by an external native simulator: the five
//! simple kinds, then every ordered pair of them as conditional rules
//! (numbered from 10), plus lookup tables mapping a conditional enumerator
//! back to its two component kinds.

use chrono::Local;
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use pcolsim_engine::RuleKind;

/// Writes `<path>.h` and `<path>.c`.
pub fn write_rules_header(path: &Path) -> io::Result<()> {
    let header_path = path.with_extension("h");
    let source_path = path.with_extension("c");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("rules");

    info!("generating rules C header in {}", header_path.display());

    let mut header = String::new();
    let _ = writeln!(header, "// vim:filetype=c");
    let _ = writeln!(header, "/**");
    let _ = writeln!(header, " * @file {}.h", stem);
    let _ = writeln!(header, " * @brief P colony simulator rule types");
    let _ = writeln!(
        header,
        " * This header defines all of the rule types that are accepted by the simulator."
    );
    let _ = writeln!(
        header,
        " * This file was auto-generated by pcolsim --ruleheader on {}",
        Local::now().format("%d %b %Y at %H:%M")
    );
    let _ = writeln!(header, " */");
    let _ = writeln!(header, "#ifndef {}_H", stem.to_uppercase());
    let _ = writeln!(header, "#define {}_H", stem.to_uppercase());
    let _ = writeln!(header);
    let _ = writeln!(header, "#include <stdint.h>");
    let _ = writeln!(header, "typedef enum _rule_type {{");
    let _ = writeln!(header, "    //non-conditional (single rules)");
    let _ = writeln!(header, "    RULE_TYPE_NONE = 0,");

    let mut rule_names = String::new();
    for kind in RuleKind::ALL {
        let _ = writeln!(header, "    RULE_TYPE_{},", kind.enumerator());
        let _ = write!(
            rule_names,
            "[RULE_TYPE_{}] = \"{}\", ",
            kind.enumerator(),
            kind.operator()
        );
    }

    let mut lookup_first = String::new();
    let mut lookup_second = String::new();

    let _ = writeln!(header, "    //conditional (pair of rules)");
    let mut next_value = Some(10);
    for first in RuleKind::ALL {
        for second in RuleKind::ALL {
            let _ = write!(lookup_first, "RULE_TYPE_{}, ", first.enumerator());
            let _ = write!(lookup_second, "RULE_TYPE_{}, ", second.enumerator());

            // Only the first conditional enumerator carries an explicit
            // value; the rest follow on from it.
            match next_value.take() {
                Some(value) => {
                    let _ = writeln!(
                        header,
                        "    RULE_TYPE_CONDITIONAL_{}_{} = {},",
                        first.enumerator(),
                        second.enumerator(),
                        value
                    );
                }
                None => {
                    let _ = writeln!(
                        header,
                        "    RULE_TYPE_CONDITIONAL_{}_{},",
                        first.enumerator(),
                        second.enumerator()
                    );
                }
            }
        }
    }

    let _ = writeln!(header, "}} rule_type_t;");
    let _ = writeln!(header);
    let _ = writeln!(
        header,
        "// the tables are generated according to the order of the rules defined in rule_type_t"
    );
    let _ = writeln!(header, "extern rule_type_t lookupFirst[];");
    let _ = writeln!(header, "extern rule_type_t lookupSecond[];");
    let _ = writeln!(header);
    let _ = writeln!(header, "#ifdef PCOL_SIM");
    let _ = writeln!(header, "    extern char* ruleNames[];");
    let _ = writeln!(header, "#endif");
    let _ = writeln!(header);
    let _ = writeln!(header, "#endif");
    fs::write(&header_path, header)?;

    info!("generating rules C source in {}", source_path.display());

    let mut source = String::new();
    let _ = writeln!(source, "#include \"{}.h\"", stem);
    let _ = writeln!(source, "rule_type_t lookupFirst[] = {{{}}};", lookup_first);
    let _ = writeln!(source, "rule_type_t lookupSecond[] = {{{}}};", lookup_second);
    let _ = writeln!(source);
    let _ = writeln!(source, "#ifdef PCOL_SIM");
    let _ = writeln!(source, "    char* ruleNames[] = {{{}}};", rule_names);
    let _ = writeln!(source, "#endif");
    fs::write(&source_path, source)?;

    Ok(())
}
