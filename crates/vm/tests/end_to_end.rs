//! End-to-end execution tests against hand-assembled object programs.
//!
//! These stand in for what `patitoc`'s own integration tests exercise via
//! real source text; here the object programs are built directly so the
//! VM can be verified independently of the compiler.

use patito_core::{ConstantValue, FunctionDescriptor, ObjectProgram, Op, Param, QuadArg, Quadruple, Resources, Type};
use patito_vm::VirtualMachine;

fn int_const(prog: &mut ObjectProgram, addr: i64, v: i64) {
    prog.constants.insert(addr, ConstantValue::Int(v));
}

/// ```text
/// function int factorial(n: int) {
///     if (n < 2) {
///         return(1);
///     } else {
///         return(n * factorial(n - 1));
///     }
/// }
/// main() {
///     var r: int;
///     r = factorial(5);
///     print(r);
/// }
/// ```
#[test]
fn recursive_factorial_of_five() {
    let mut prog = ObjectProgram { program_name: "factorial".to_string(), ..Default::default() };

    int_const(&mut prog, 7000, 2);
    int_const(&mut prog, 7001, 1);
    int_const(&mut prog, 7002, 5);

    prog.functions.insert(
        "factorial".to_string(),
        FunctionDescriptor {
            return_type: Type::Int,
            quad_start: 1,
            return_address: Some(2000),
            params: vec![Param { name: "n".to_string(), ty: Type::Int }],
            resources: Resources { local_int: 1, temp_int: 4, params_int: 1, ..Default::default() },
        },
    );
    prog.functions.insert(
        "main".to_string(),
        FunctionDescriptor {
            return_type: Type::Void,
            quad_start: 12,
            return_address: None,
            params: vec![],
            resources: Resources { temp_int: 1, ..Default::default() },
        },
    );

    prog.quadruples = vec![
        Quadruple::new(Op::Goto, QuadArg::None, QuadArg::None, 12i64), // 0
        Quadruple::new(Op::Lt, 3000i64, 7000i64, 5000i64),             // 1: t0 = n < 2
        Quadruple::new(Op::GotoF, 5000i64, QuadArg::None, 4i64),       // 2: else -> 4
        Quadruple::new(Op::Return, 7001i64, QuadArg::None, 2000i64),   // 3: return 1
        Quadruple::new(Op::Minus, 3000i64, 7001i64, 5001i64),          // 4: t1 = n - 1
        Quadruple::new(Op::Era, "factorial", QuadArg::None, QuadArg::None), // 5
        Quadruple::new(Op::Param, 5001i64, QuadArg::None, 0i64),       // 6
        Quadruple::new(Op::Gosub, "factorial", QuadArg::None, 1i64),   // 7
        Quadruple::new(Op::Assign, 2000i64, QuadArg::None, 5002i64),   // 8: t2 = call result
        Quadruple::new(Op::Mul, 3000i64, 5002i64, 5003i64),            // 9: t3 = n * t2
        Quadruple::new(Op::Return, 5003i64, QuadArg::None, 2000i64),   // 10
        Quadruple::new(Op::EndFunc, QuadArg::None, QuadArg::None, QuadArg::None), // 11
        Quadruple::new(Op::Era, "factorial", QuadArg::None, QuadArg::None), // 12: main
        Quadruple::new(Op::Param, 7002i64, QuadArg::None, 0i64),       // 13
        Quadruple::new(Op::Gosub, "factorial", QuadArg::None, 1i64),   // 14
        Quadruple::new(Op::Assign, 2000i64, QuadArg::None, 5000i64),   // 15: main's t0
        Quadruple::new(Op::Assign, 5000i64, QuadArg::None, 1000i64),   // 16: r = t0
        Quadruple::new(Op::Print, 1000i64, QuadArg::None, QuadArg::None), // 17
        Quadruple::new(Op::End, QuadArg::None, QuadArg::None, QuadArg::None), // 18
    ];

    let mut vm = VirtualMachine::new(&prog).unwrap();
    let out = vm.run().unwrap();
    assert_eq!(out, vec!["120".to_string()]);
}

/// ```text
/// main() {
///     var i: int;
///     var sum: int;
///     i = 1;
///     while (i < 6) do {
///         sum = sum + i;
///         i = i + 1;
///     }
///     print(sum);
/// }
/// ```
#[test]
fn while_loop_sums_one_through_five() {
    let mut prog = ObjectProgram { program_name: "sum".to_string(), ..Default::default() };
    int_const(&mut prog, 7000, 1);
    int_const(&mut prog, 7001, 6);

    prog.functions.insert(
        "main".to_string(),
        FunctionDescriptor {
            return_type: Type::Void,
            quad_start: 1,
            return_address: None,
            params: vec![],
            resources: Resources { temp_int: 1, ..Default::default() },
        },
    );

    // globals: i = 1000, sum = 1001
    prog.quadruples = vec![
        Quadruple::new(Op::Goto, QuadArg::None, QuadArg::None, 1i64), // 0
        Quadruple::new(Op::Assign, 7000i64, QuadArg::None, 1000i64),  // 1: i = 1
        Quadruple::new(Op::Lt, 1000i64, 7001i64, 5000i64),            // 2: t0 = i < 6
        Quadruple::new(Op::GotoF, 5000i64, QuadArg::None, 8i64),      // 3: exit -> 8
        Quadruple::new(Op::Plus, 1001i64, 1000i64, 5000i64),          // 4: t0 = sum + i
        Quadruple::new(Op::Assign, 5000i64, QuadArg::None, 1001i64),  // 5: sum = t0
        Quadruple::new(Op::Plus, 1000i64, 7000i64, 5000i64),          // 6: t0 = i + 1
        Quadruple::new(Op::Assign, 5000i64, QuadArg::None, 1000i64),  // 7: i = t0
        // loop condition re-check lives at quad 2; patch a GOTO back to it
        Quadruple::new(Op::Print, 1001i64, QuadArg::None, QuadArg::None), // 8
        Quadruple::new(Op::End, QuadArg::None, QuadArg::None, QuadArg::None), // 9
    ];
    // fix the back-edge: after incrementing i, jump to the condition check (quad 2)
    prog.quadruples[7] = Quadruple::new(Op::Assign, 5000i64, QuadArg::None, 1000i64);
    prog.quadruples.insert(8, Quadruple::new(Op::Goto, QuadArg::None, QuadArg::None, 2i64));
    // GOTOF's exit target must now point past the inserted back-edge goto
    prog.quadruples[3] = Quadruple::new(Op::GotoF, 5000i64, QuadArg::None, 9i64);

    let mut vm = VirtualMachine::new(&prog).unwrap();
    let out = vm.run().unwrap();
    assert_eq!(out, vec!["15".to_string()]);
}

#[test]
fn float_widening_on_assignment_is_unchecked_at_runtime() {
    // The VM trusts the compiler's semantic checks; it just copies values.
    // Assigning an int-valued cell into a float destination keeps it int
    // unless the source was already produced as a float by arithmetic.
    let mut prog = ObjectProgram { program_name: "widen".to_string(), ..Default::default() };
    int_const(&mut prog, 7000, 3);
    prog.functions.insert(
        "main".to_string(),
        FunctionDescriptor {
            return_type: Type::Void,
            quad_start: 1,
            return_address: None,
            params: vec![],
            resources: Resources::default(),
        },
    );
    prog.quadruples = vec![
        Quadruple::new(Op::Goto, QuadArg::None, QuadArg::None, 1i64),
        Quadruple::new(Op::Assign, 7000i64, QuadArg::None, 2000i64), // global float x = 3
        Quadruple::new(Op::Print, 2000i64, QuadArg::None, QuadArg::None),
        Quadruple::new(Op::End, QuadArg::None, QuadArg::None, QuadArg::None),
    ];
    let mut vm = VirtualMachine::new(&prog).unwrap();
    let out = vm.run().unwrap();
    assert_eq!(out, vec!["3".to_string()]);
}
