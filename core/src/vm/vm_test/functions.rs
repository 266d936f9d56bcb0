use super::*;

#[test]
fn test_call_with_arguments() {
    assert_eq!(output_of("func add(a, b) { return a + b } println(add(2, 3))"), "5\n");
}

#[test]
fn test_argument_order() {
    assert_eq!(output_of("func sub(a, b) { return a - b } println(sub(10, 3))"), "7\n");
}

#[test]
fn test_recursive_factorial() {
    let src = r#"
        func fact(n) {
            if (n <= 1) { return 1 }
            return n * fact(n - 1)
        }
        println(fact(5))
    "#;
    assert_eq!(output_of(src), "120\n");
}

#[test]
fn test_fibonacci() {
    let src = r#"
        func fib(n) {
            if (n < 2) { return n }
            return fib(n - 1) + fib(n - 2)
        }
        println(fib(15))
    "#;
    assert_eq!(output_of(src), "610\n");
}

#[test]
fn test_calls_leave_stack_balanced() {
    let module = compile_source("func id(x) { return x } let a = id(1) + id(2) println(a)").unwrap();
    let mut vm = Vm::new();
    let mut out = Vec::new();
    vm.run(&module, &mut out).unwrap();
    assert_eq!(out, b"3\n");
    assert!(vm.stack().is_empty());
}

#[test]
fn test_function_sees_and_updates_globals() {
    let src = r#"
        let total = 0
        func add(n) { total = total + n return total }
        let a = add(2)
        let b = add(3)
        println(total)
        println(b)
    "#;
    assert_eq!(output_of(src), "5\n5\n");
}

#[test]
fn test_parameter_shadows_global() {
    let src = "let a = 100 func f(a) { return a + 1 } println(f(1)) println(a)";
    assert_eq!(output_of(src), "2\n100\n");
}

#[test]
fn test_let_in_function_is_a_global_slot() {
    let src = r#"
        func remember(v) { let last = v return v }
        let x = remember(7)
        println(last)
    "#;
    // `last` was declared while compiling the body, so it resolves at top level too.
    assert_eq!(output_of(src), "7\n");
}

#[test]
fn test_early_return_skips_rest_of_body() {
    let src = r#"
        func f(n) {
            if (n > 0) { return 1 }
            println("not reached for positive")
            return 0
        }
        println(f(5))
    "#;
    assert_eq!(output_of(src), "1\n");
}

#[test]
fn test_late_declared_function_is_not_executed_inline() {
    assert_eq!(output_of(r#"println(1) func f() { println("body") return 7 } println(f())"#), "1\nbody\n7\n");
}

#[test]
fn test_void_result_used_as_value_underflows() {
    let (_, result) = exec_source("func f() { } let x = f()");
    assert_eq!(result, Err(VmError::StackUnderflow { pc: 19 }));
}

#[test]
fn test_unbounded_recursion_overflows_frames() {
    let (_, result) = exec_source("func r(n) { return r(n + 1) } println(r(0))");
    assert_eq!(result, Err(VmError::FrameOverflow(256)));
}

#[test]
fn test_unbounded_recursion_overflows_stack() {
    let module = compile_source("func r(n) { return r(n + 1) } println(r(0))").unwrap();
    let limits = VmLimits {
        max_stack: 100,
        max_frames: 1000,
        ..VmLimits::default()
    };
    let (_, result) = exec_module(&module, limits);
    assert_eq!(result, Err(VmError::StackOverflow(100)));
}

#[test]
fn test_return_without_call() {
    let module = Asm::default().op(Op::Ret).u32(0).module(Vec::new());
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::ReturnWithoutCall { pc: 0 }));
}

#[test]
fn test_parameter_out_of_frame() {
    let module = Asm::default().op(Op::Arg).u32(5).module(Vec::new());
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::BadParameter(5)));
}
