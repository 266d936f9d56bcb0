use super::*;
use crate::vm::disassemble;

#[test]
fn test_encoded_module_runs_identically() {
    let src = r#"
        func sq(n) { return n * n }
        let i = 1
        while (i <= 3) { print(sq(i)) print(" ") i = i + 1 }
        println("done")
    "#;
    let module = compile_source(src).unwrap();
    let decoded = BytecodeModule::decode(&module.encode()).unwrap();
    assert_eq!(decoded, module);
    let (direct, _) = exec_module(&module, VmLimits::default());
    let (loaded, result) = exec_module(&decoded, VmLimits::default());
    assert!(result.is_ok());
    assert_eq!(direct, "1 4 9 done\n");
    assert_eq!(loaded, direct);
}

#[test]
fn test_step_limit_stops_infinite_loop() {
    let module = compile_source("while (1) { }").unwrap();
    let limits = VmLimits {
        max_steps: Some(1000),
        ..VmLimits::default()
    };
    let mut vm = Vm::with_limits(limits);
    let mut out = Vec::new();
    assert_eq!(vm.run(&module, &mut out), Err(VmError::StepLimit(1000)));
    assert_eq!(vm.steps(), 1000);
}

#[test]
fn test_pc_and_limits_after_run() {
    let limits = VmLimits {
        max_stack: 8,
        ..VmLimits::default()
    };
    let mut vm = Vm::with_limits(limits);
    assert_eq!(vm.limits(), &limits);

    let module = compile_source("println(1)").unwrap();
    let mut out = Vec::new();
    vm.run(&module, &mut out).unwrap();
    assert_eq!(vm.pc(), module.code.len(), "HALT is the last byte");

    let mut bad = Asm::default().op(Op::PushI).i32(1).module(Vec::new());
    bad.code.push(99);
    assert!(vm.run(&bad, &mut out).is_err());
    assert_eq!(vm.pc(), 5, "stops on the undecodable opcode");
}

#[test]
fn test_unknown_opcode() {
    let mut module = Asm::default().op(Op::PushI).i32(1).module(Vec::new());
    module.code.push(99);
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::UnknownOpcode { op: 99, pc: 5 }));
}

#[test]
fn test_truncated_operand() {
    let module = BytecodeModule::new(Vec::new(), vec![Op::PushI.byte(), 1, 0]);
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::TruncatedInstruction { pc: 0 }));
}

#[test]
fn test_bad_string_id() {
    let module = Asm::default().op(Op::PushStr).u32(3).op(Op::Print).module(Vec::new());
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::BadStringId(3)));
}

#[test]
fn test_slot_outside_globals() {
    let module = compile_source("let a = 1 let b = 2 println(b)").unwrap();
    let limits = VmLimits {
        globals: 1,
        ..VmLimits::default()
    };
    let (_, result) = exec_module(&module, limits);
    assert_eq!(result, Err(VmError::SlotOverflow(1)));
}

#[test]
fn test_pop_from_empty_stack() {
    let module = Asm::default().op(Op::Add).module(Vec::new());
    let (_, result) = exec_module(&module, VmLimits::default());
    assert_eq!(result, Err(VmError::StackUnderflow { pc: 0 }));
}

#[test]
fn test_disassembly_of_compiled_program() {
    let module = compile_source(r#"func f(a) { return a } println(f("x"))"#).unwrap();
    let listing = disassemble(&module).unwrap();
    let ops: Vec<Op> = listing.instructions.iter().map(|line| line.op).collect();
    assert_eq!(
        ops,
        vec![Op::Jmp, Op::Arg, Op::Ret, Op::Ret, Op::PushStr, Op::Call, Op::Println, Op::Halt]
    );
    assert_eq!(listing.instructions[0].target, Some(20));
    assert_eq!(listing.instructions[5].target, Some(5));
    assert_eq!(listing.instructions[4].string.as_deref(), Some("x"));
}
