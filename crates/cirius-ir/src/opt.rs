//! Dead-store elimination.

use cirius_util::FxHashSet;

use crate::instr::{Instr, Operand};

/// Run dead-store elimination until the instruction count stabilizes.
///
/// Each round keeps an instruction iff it stores nothing, its destination
/// name is read somewhere in the list, or it is structural. Removing a
/// store can orphan the stores feeding it, so the pass iterates to a
/// fixpoint; the result is always a subsequence of the input.
pub fn optimize(instrs: Vec<Instr>) -> Vec<Instr> {
    let mut code = instrs;
    loop {
        let before = code.len();
        code = eliminate_dead_stores(code);
        if code.len() == before {
            return code;
        }
    }
}

fn eliminate_dead_stores(code: Vec<Instr>) -> Vec<Instr> {
    let used: FxHashSet<String> = code
        .iter()
        .flat_map(|instr| [instr.arg1.as_ref(), instr.arg2.as_ref()])
        .flatten()
        .filter_map(Operand::as_name)
        .map(str::to_string)
        .collect();

    code.into_iter()
        .filter(|instr| match instr.dest_name() {
            None => true,
            Some(dest) => instr.op.is_structural() || used.contains(dest),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::Op;
    use crate::lower;
    use cirius_lex::tokenize;
    use cirius_par::parse;

    fn optimized(source: &str) -> (Vec<Instr>, Vec<Instr>) {
        let program = parse(tokenize(source).expect("test source should lex"))
            .expect("test source should parse");
        let raw = lower(&program);
        let opt = optimize(raw.clone());
        (raw, opt)
    }

    fn rendered(instrs: &[Instr]) -> Vec<String> {
        instrs.iter().map(Instr::to_string).collect()
    }

    /// True when `sub` preserves the relative order of a subset of `sup`.
    fn is_subsequence(sub: &[Instr], sup: &[Instr]) -> bool {
        let mut iter = sup.iter();
        sub.iter().all(|needle| iter.any(|candidate| candidate == needle))
    }

    #[test]
    fn removes_unread_stores() {
        let (_, opt) = optimized("func main() { x = 1 y = 2 print(y) }");
        assert_eq!(
            rendered(&opt),
            vec!["FUNC_BEGIN main", "ASSIGN y 2", "PRINT y", "FUNC_END main"]
        );
    }

    #[test]
    fn removal_cascades_to_feeding_temps() {
        // x is never read, so ASSIGN x t2 dies; that orphans t2, which
        // orphans t1 on the following rounds.
        let (_, opt) = optimized("func main() { x = (1 + 2) * 3 print(9) }");
        assert_eq!(
            rendered(&opt),
            vec!["FUNC_BEGIN main", "PRINT 9", "FUNC_END main"]
        );
    }

    #[test]
    fn keeps_stores_that_feed_prints() {
        let (raw, opt) = optimized("func main() { x = 1 + 2 print(x) }");
        assert_eq!(raw, opt);
    }

    #[test]
    fn keeps_structural_instructions() {
        let (_, opt) = optimized("func main() { while true { print(1) } }");
        let text = rendered(&opt);
        assert!(text.contains(&"FUNC_BEGIN main".to_string()));
        assert!(text.contains(&"FUNC_END main".to_string()));
        assert!(text.contains(&"LABEL WHILE1".to_string()));
        assert!(text.contains(&"LABEL END_WHILE2".to_string()));
    }

    #[test]
    fn keeps_statement_calls() {
        let (_, opt) = optimized("func f(n) { print(n) } func main() { f(1) }");
        let text = rendered(&opt);
        assert!(text.contains(&"CALL f 1".to_string()));
    }

    #[test]
    fn expression_call_with_unread_result_is_removed() {
        // The store into x dies first, then the CALL whose destination
        // temp became unread. Argument staging survives: ARG stores
        // nothing.
        let (_, opt) = optimized("func f(n) { return n } func main() { x = f(1) }");
        let text = rendered(&opt);
        assert!(!text.iter().any(|l| l.starts_with("ASSIGN x")));
        assert!(!text.iter().any(|l| l.starts_with("CALL")));
        assert!(text.contains(&"ARG 1".to_string()));
    }

    #[test]
    fn output_is_a_subsequence_of_input() {
        let (raw, opt) = optimized(
            "func main() {
                a = 1
                b = a + 2
                c = 9
                for i in 1..b { print(i) }
            }",
        );
        assert!(is_subsequence(&opt, &raw));
        assert!(opt.len() < raw.len(), "c = 9 should have been removed");
    }

    #[test]
    fn optimizer_is_idempotent() {
        let (_, opt) = optimized(
            "func main() {
                x = input()
                unused = x * 2
                if x > 0 { print(x) } else { print(0) }
            }",
        );
        let again = optimize(opt.clone());
        assert_eq!(opt, again);
    }

    #[test]
    fn unused_input_read_is_removed() {
        let (_, opt) = optimized("func main() { input() print(1) }");
        assert!(!opt.iter().any(|i| i.op == Op::Input));
    }

    #[test]
    fn empty_function_keeps_its_brackets() {
        let (_, opt) = optimized("func noop() {} func main() { noop() }");
        let text = rendered(&opt);
        assert_eq!(
            text,
            vec![
                "FUNC_BEGIN noop",
                "FUNC_END noop",
                "FUNC_BEGIN main",
                "CALL noop 0",
                "FUNC_END main",
            ]
        );
    }
}
