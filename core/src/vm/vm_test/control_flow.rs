use super::*;

#[test]
fn test_if_else_takes_one_branch() {
    let src = r#"
        let x = 5
        if (x > 3) { println("big") } else { println("small") }
        if (x > 9) { println("huge") }
        if (0) { println("never") } else { println("else") }
    "#;
    assert_eq!(output_of(src), "big\nelse\n");
}

#[test]
fn test_while_counts() {
    assert_eq!(output_of("let i = 0 while (i < 3) { println(i) i = i + 1 }"), "0\n1\n2\n");
}

#[test]
fn test_nested_loops() {
    let src = r#"
        let i = 0
        while (i < 2) {
            let j = 0
            while (j < 2) {
                print(i * 10 + j) print(" ")
                j = j + 1
            }
            i = i + 1
        }
        println("")
    "#;
    assert_eq!(output_of(src), "0 1 10 11 \n");
}

#[test]
fn test_blocks_do_not_scope() {
    assert_eq!(output_of("{ let y = 4 { y = y + 1 } } println(y)"), "5\n");
}

#[test]
fn test_loop_with_false_condition_never_runs() {
    assert_eq!(output_of("while (0) { println(1) } println(2)"), "2\n");
}

#[test]
fn test_running_off_the_end_is_an_error() {
    let module = Asm::default().op(Op::PushI).i32(1).op(Op::Print).module(Vec::new());
    let (out, result) = exec_module(&module, VmLimits::default());
    assert_eq!(out, "1");
    assert_eq!(result, Err(VmError::UnexpectedEnd { pc: 6 }));
}

#[test]
fn test_jump_outside_code_is_rejected() {
    let module = Asm::default().op(Op::Jmp).i32(100).module(Vec::new());
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::BadJumpTarget { target: 105, pc: 0 }));

    let module = Asm::default().op(Op::Jmp).i32(-6).module(Vec::new());
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::BadJumpTarget { target: -1, pc: 0 }));
}

#[test]
fn test_jz_pops_condition() {
    // PUSHI 0; JZ +5 (skips PUSHI 7); PUSHI 7; PUSHI 9; PRINT; HALT
    let module = Asm::default()
        .op(Op::PushI)
        .i32(0)
        .op(Op::Jz)
        .i32(5)
        .op(Op::PushI)
        .i32(7)
        .op(Op::PushI)
        .i32(9)
        .op(Op::Print)
        .op(Op::Halt)
        .module(Vec::new());
    let mut vm = Vm::new();
    let mut out = Vec::new();
    vm.run(&module, &mut out).unwrap();
    assert_eq!(out, b"9");
    assert!(vm.stack().is_empty());
}
