use hovalaag_asm::disasm::fmt_instruction;
use hovalaag_asm::{assemble, ImageError, Program};
use pretty_assertions::assert_eq;

const LOOP: &str = "\
start: A=IN1,B=A
       C=A+B,F=ZERO()
       W=-3,JMPT START
       D=A,A=IN2,OUT2=W
       DECNZ START
";

#[test]
fn image_decodes_to_same_program() {
    let asm = assemble(LOOP).unwrap();
    let bytes = asm.program.to_bytes();
    assert_eq!(bytes.len(), 5 * 4);
    let back = Program::from_bytes(&bytes).unwrap();
    assert_eq!(back, asm.program);
}

#[test]
fn mnemonics_survive_the_trip() {
    let asm = assemble("  A=IN2,W=A,OUT2=W\n").unwrap();
    let back = Program::from_bytes(&asm.program.to_bytes()).unwrap();
    assert_eq!(fmt_instruction(&back.instructions()[0]), fmt_instruction(&asm.program.instructions()[0]));
}

#[test]
fn bad_images() {
    assert_eq!(Program::from_bytes(&[1, 2, 3]), Err(ImageError::Misaligned(3)));
    assert_eq!(Program::from_bytes(&[]), Err(ImageError::Empty));
    assert_eq!(Program::from_bytes(&vec![0; 256 * 4]), Err(ImageError::TooLarge(256)));
}
