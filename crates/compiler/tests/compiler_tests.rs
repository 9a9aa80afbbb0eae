//! End-to-end tests: Patito source text through the full
//! lex/parse/codegen pipeline, then through the virtual machine.

use patc::{compile_source, compile_source_with_config, CompileError, CompilerConfig};
use patito_core::{
    CONST_FLOAT_BASE, CONST_INT_BASE, GLOBAL_FLOAT_BASE, GLOBAL_INT_BASE, LOCAL_FLOAT_BASE, LOCAL_INT_BASE, Op, TEMP_FLOAT_BASE,
    TEMP_INT_BASE,
};
use patito_vm::VirtualMachine;

fn run(source: &str) -> Vec<String> {
    let object = compile_source(source).unwrap();
    let mut vm = VirtualMachine::new(&object).unwrap();
    vm.run().unwrap()
}

#[test]
fn arithmetic_precedence_and_print() {
    let out = run("programa demo; var a:int; main { a = 2 + 3 * 4; print(a); } end");
    assert_eq!(out, vec!["14".to_string()]);
}

#[test]
fn while_loop_accumulates() {
    let out = run("programa demo; var i,s:int; main { i=1; s=0; while (i<6) do { s=s+i; i=i+1; }; print(s); } end");
    assert_eq!(out, vec!["15".to_string()]);
}

#[test]
fn if_else_selects_branch() {
    let out = run("programa demo; var x:int; main { x = 5; if (x > 3) { print(\"big\"); } else { print(\"small\"); }; } end");
    assert_eq!(out, vec!["big".to_string()]);

    let out = run("programa demo; var x:int; main { x = 1; if (x > 3) { print(\"big\"); } else { print(\"small\"); }; } end");
    assert_eq!(out, vec!["small".to_string()]);
}

#[test]
fn recursive_factorial_of_five() {
    let src = "programa demo; int fact(x:int)[{ if (x<2) { return(1); } else { return(x*fact(x-1)); }; }]; main { print(fact(5)); } end";
    let out = run(src);
    assert_eq!(out, vec!["120".to_string()]);
}

#[test]
fn recursive_fibonacci_of_ten() {
    let src = "programa demo; \
               int fib(n:int)[{ \
                   if (n < 2) { return(n); } else { return(fib(n-1) + fib(n-2)); }; \
               }]; \
               main { print(fib(10)); } end";
    let out = run(src);
    assert_eq!(out, vec!["55".to_string()]);
}

#[test]
fn forward_reference_to_a_function_declared_later_compiles_and_runs() {
    // `caller` is declared (and emitted) before `callee`, so its GOSUB has
    // no quad_start yet at the point it's generated -- exercises the
    // gosub-patch pass rather than a purely backward call graph.
    let src = "programa demo; \
               int caller(x:int)[{ return(callee(x) + 1); }]; \
               int callee(x:int)[{ return(x*2); }]; \
               main { print(caller(10)); } end";
    let out = run(src);
    assert_eq!(out, vec!["21".to_string()]);
}

#[test]
fn unary_minus_lowers_to_a_minus_quad_against_zero() {
    let out = run("programa demo; var a:int; main { a = -5 + 2; print(a); } end");
    assert_eq!(out, vec!["-3".to_string()]);
}

#[test]
fn float_to_int_assignment_is_a_semantic_error_and_emits_nothing() {
    let err = compile_source("programa demo; var a:int; var b:float; main { b = 1.5; a = b; } end").unwrap_err();
    match err {
        CompileError::Semantic(errors) => {
            assert!(!errors.is_empty());
            assert!(errors.to_string().contains("cannot assign"));
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn undeclared_variable_is_a_semantic_error() {
    let err = compile_source("programa demo; main { x = 1; } end").unwrap_err();
    assert!(matches!(err, CompileError::Semantic(_)));
}

#[test]
fn collects_every_semantic_error_by_default_rather_than_stopping_at_the_first() {
    let err = compile_source("programa demo; main { x = 1; y = 2; } end").unwrap_err();
    match err {
        CompileError::Semantic(errors) => assert_eq!(errors.0.len(), 2),
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn stop_at_first_error_config_halts_after_the_first_diagnostic() {
    let config = CompilerConfig::new().with_stop_at_first_error(true);
    let err = compile_source_with_config("programa demo; main { x = 1; y = 2; } end", &config).unwrap_err();
    match err {
        CompileError::Semantic(errors) => assert_eq!(errors.0.len(), 1),
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn shrinking_the_segment_size_surfaces_pool_exhaustion() {
    let mut src = String::from("programa demo; ");
    for i in 0..20 {
        src.push_str(&format!("var v{i}:int; "));
    }
    src.push_str("main {} end");

    let config = CompilerConfig::new().with_segment_size(8);
    let err = compile_source_with_config(&src, &config).unwrap_err();
    match err {
        CompileError::Semantic(errors) => {
            assert!(errors.to_string().contains("exhausted"));
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn every_address_lands_in_its_declared_segment() {
    let src = "programa demo; var g:int; var gf:float; \
               int f(p:int)[{ var l:int; l = p + g; return(l); }]; \
               main { var m:float; m = 1.0 + gf; print(f(1)); } end";
    let object = compile_source(src).unwrap();

    for quad in &object.quadruples {
        for arg in [quad.arg1(), quad.arg2(), quad.result()] {
            if let Some(addr) = arg.as_num() {
                let in_any_segment = (GLOBAL_INT_BASE..GLOBAL_INT_BASE + 1000).contains(&addr)
                    || (GLOBAL_FLOAT_BASE..GLOBAL_FLOAT_BASE + 1000).contains(&addr)
                    || (LOCAL_INT_BASE..LOCAL_INT_BASE + 1000).contains(&addr)
                    || (LOCAL_FLOAT_BASE..LOCAL_FLOAT_BASE + 1000).contains(&addr)
                    || (TEMP_INT_BASE..TEMP_INT_BASE + 1000).contains(&addr)
                    || (TEMP_FLOAT_BASE..TEMP_FLOAT_BASE + 1000).contains(&addr)
                    || (CONST_INT_BASE..CONST_INT_BASE + 1000).contains(&addr)
                    || (CONST_FLOAT_BASE..CONST_FLOAT_BASE + 1000).contains(&addr);
                assert!(in_any_segment, "address {addr} landed outside every segment");
            }
        }
    }
}

#[test]
fn repeated_int_literals_intern_to_the_same_constant_address() {
    let object = compile_source("programa demo; var a,b:int; main { a = 7; b = 7; } end").unwrap();
    let assigns: Vec<_> = object.quadruples.iter().filter(|q| q.op() == Op::Assign).collect();
    assert_eq!(assigns[0].arg1(), assigns[1].arg1());
}

#[test]
fn compilation_is_deterministic_across_runs() {
    let src = "programa demo; int fact(x:int)[{ if (x<2) { return(1); } else { return(x*fact(x-1)); }; }]; main { print(fact(5)); } end";
    let a = compile_source(src).unwrap();
    let b = compile_source(src).unwrap();
    assert_eq!(a.quadruples, b.quadruples);
    assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
}

#[test]
fn object_program_round_trips_through_json() {
    let src = "programa demo; int fib(n:int)[{ if (n<2) { return(n); } else { return(fib(n-1)+fib(n-2)); }; }]; main { print(fib(10)); } end";
    let object = compile_source(src).unwrap();
    let json = object.to_json_pretty().unwrap();
    let reloaded = patito_core::ObjectProgram::from_json(&json).unwrap();

    let mut vm = VirtualMachine::new(&reloaded).unwrap();
    let out = vm.run().unwrap();
    assert_eq!(out, vec!["55".to_string()]);
}

#[test]
fn the_first_quadruple_is_always_a_goto_to_mains_start() {
    let object = compile_source("programa demo; int f(x:int)[{ return(x); }]; main { print(f(1)); } end").unwrap();
    let first = &object.quadruples[0];
    assert_eq!(first.op(), Op::Goto);
    let main_start = first.result().as_num().unwrap();
    assert_eq!(object.functions.get("main").unwrap().quad_start, main_start);
}
