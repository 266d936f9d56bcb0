use super::*;

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let src = r#"
        func side(v) { println("side") return v }
        println(0 && side(1))
        println(1 || side(0))
    "#;
    assert_eq!(output_of(src), "side\n0\nside\n1\n");
}

#[test]
fn test_logical_results_are_zero_or_one() {
    assert_eq!(output_of("println(5 && 7) println(0 || -3) println(!5) println(!0)"), "1\n1\n0\n1\n");
}

#[test]
fn test_comparisons_push_booleans_as_ints() {
    assert_eq!(
        output_of("println(3 < 4) println(3 == 4) println(4 >= 4) println(4 != 4) println(5 > 4) println(5 <= 4)"),
        "1\n0\n1\n0\n1\n0\n"
    );
}

#[test]
fn test_division_by_zero_halts_without_further_output() {
    let (out, result) = exec_source("println(1) println(1 / 0) println(2)");
    assert_eq!(out, "1\n");
    assert_eq!(result, Err(VmError::DivisionByZero));
}

#[test]
fn test_modulo_by_zero_halts_without_further_output() {
    let (out, result) = exec_source("let z = 0 println(7 % z) println(2)");
    assert_eq!(out, "");
    assert_eq!(result, Err(VmError::ModuloByZero));
}

#[test]
fn test_integer_arithmetic_wraps() {
    assert_eq!(output_of("println(2147483647 + 1)"), "-2147483648\n");
    assert_eq!(output_of("println((0 - 2147483647 - 1) / -1)"), "-2147483648\n");
    assert_eq!(output_of("println(-7 / 2) println(-7 % 3)"), "-3\n-1\n");
}

#[test]
fn test_redeclaration_reads_first_slot() {
    let src = r#"
        let x = 1
        let x = 2
        println(x)
        x = 3
        println(x)
    "#;
    assert_eq!(output_of(src), "1\n3\n");
}

#[test]
fn test_int_in_string_tag_range_prints_as_int() {
    assert_eq!(output_of("println(1073741824) println(1073741824 + 5)"), "1073741824\n1073741829\n");
}

#[test]
fn test_string_in_arithmetic_uses_tagged_encoding() {
    assert_eq!(output_of(r#"println("x" + 0)"#), "1073741824\n");
    // Each literal gets its own pool entry.
    assert_eq!(output_of(r#"println("a" == "a") let s = "a" println(s == s)"#), "0\n1\n");
}

#[test]
fn test_strings_print_raw_bytes() {
    assert_eq!(
        output_of(r#"print("hello, ") println("world") let s = "a\tb\"c\\" println(s)"#),
        "hello, world\na\tb\"c\\\n"
    );
}

#[test]
fn test_globals_start_zeroed_and_are_reset_between_runs() {
    let module = compile_source("let c = 0 c = c + 1 println(c)").unwrap();
    let mut vm = Vm::new();
    for _ in 0..2 {
        let mut out = Vec::new();
        vm.run(&module, &mut out).unwrap();
        assert_eq!(out, b"1\n");
    }
    assert_eq!(vm.globals()[0], Value::Int(1));
    assert_eq!(vm.globals()[1], Value::Int(0));
}
