//! Parsing of the `Code` attribute (JVMS §4.7.3) into a structured
//! instruction stream.
//!
//! The teacher's parser treats `Code` as just another unknown attribute and
//! skips it; every bytecode-level scanner in this workspace (API usage,
//! reflection, crypto, locale, zip-fs, JMX) needs to walk method bodies, so
//! this module adds the missing piece. It follows the same `Reader`
//! discipline as the rest of the crate: bounds-checked, `Result`-returning,
//! never panics on malformed input.
//!
//! Only operand shapes that some scanner actually inspects are decoded into
//! [`Instruction`] variants; every other opcode is skipped using the
//! standard JVM operand-length table and surfaced as [`Instruction::Other`].

use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `None` for a catch-all (`finally`) handler.
    pub catch_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub instructions: Vec<Instruction>,
    pub exception_table: Vec<ExceptionHandler>,
}

/// A decoded bytecode instruction.
///
/// `owner`/`class` fields use internal names with `/` separators, matching
/// every other class-name-bearing field in this crate (callers normalize to
/// `.`-separated names the same way [`crate::module_info`] does for package
/// names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    New { class: String },
    ANewArray { class: String },
    MultiANewArray { class: String, dimensions: u8 },
    CheckCast { class: String },
    InstanceOf { class: String },
    GetStatic { owner: String, name: String, descriptor: String },
    PutStatic { owner: String, name: String, descriptor: String },
    GetField { owner: String, name: String, descriptor: String },
    PutField { owner: String, name: String, descriptor: String },
    InvokeVirtual { owner: String, name: String, descriptor: String },
    InvokeSpecial { owner: String, name: String, descriptor: String },
    InvokeStatic { owner: String, name: String, descriptor: String },
    InvokeInterface { owner: String, name: String, descriptor: String },
    InvokeDynamic { name: String, descriptor: String },
    LoadString { value: String },
    /// Any opcode not individually modeled above. Carries the raw opcode so
    /// callers that need it (none currently do) are not blocked from adding
    /// it later without reparsing.
    Other(u8),
}

pub(crate) fn parse_code_attribute(info: &[u8], cp: &ConstantPool) -> Result<CodeAttribute> {
    let mut reader = Reader::new(info);
    let max_stack = reader.read_u2()?;
    let max_locals = reader.read_u2()?;
    let code_length = reader.read_u4()? as usize;
    let code = reader.read_bytes(code_length)?;
    let instructions = decode_instructions(code, cp)?;

    let exception_table_length = reader.read_u2()? as usize;
    let mut exception_table = Vec::with_capacity(exception_table_length);
    for _ in 0..exception_table_length {
        let start_pc = reader.read_u2()?;
        let end_pc = reader.read_u2()?;
        let handler_pc = reader.read_u2()?;
        let catch_type_index = reader.read_u2()?;
        let catch_type = if catch_type_index == 0 {
            None
        } else {
            Some(cp.get_class_name(catch_type_index)?)
        };
        exception_table.push(ExceptionHandler {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        });
    }

    // The Code attribute carries its own nested attributes
    // (LineNumberTable, LocalVariableTable, StackMapTable, ...); none of the
    // scanners need them, so they are skipped wholesale rather than parsed.
    let attributes_count = reader.read_u2()? as usize;
    for _ in 0..attributes_count {
        reader.read_u2()?; // attribute_name_index
        let len = reader.read_u4()? as usize;
        reader.read_bytes(len)?;
    }

    Ok(CodeAttribute {
        max_stack,
        max_locals,
        instructions,
        exception_table,
    })
}

fn decode_instructions(code: &[u8], cp: &ConstantPool) -> Result<Vec<Instruction>> {
    let mut reader = Reader::new(code);
    let mut instructions = Vec::new();

    while reader.remaining() > 0 {
        let instruction_start = reader.pos();
        let opcode = reader.read_u1()?;
        let instruction = decode_one(&mut reader, opcode, instruction_start, cp)?;
        instructions.push(instruction);
    }

    Ok(instructions)
}

/// Decode a single instruction at `opcode`, advancing `reader` past its
/// operands (and, for `wide`, past the operands of the instruction it
/// modifies). `instruction_start` is the opcode's offset from the start of
/// the method's code array, needed for `tableswitch`/`lookupswitch` padding.
fn decode_one(
    reader: &mut Reader<'_>,
    opcode: u8,
    instruction_start: usize,
    cp: &ConstantPool,
) -> Result<Instruction> {
    match opcode {
        // ldc / ldc_w / ldc2_w: may push a String constant.
        0x12 => {
            let index = reader.read_u1()? as u16;
            Ok(load_constant(cp, index)?)
        }
        0x13 | 0x14 => {
            let index = reader.read_u2()?;
            Ok(load_constant(cp, index)?)
        }

        // new
        0xbb => Ok(Instruction::New {
            class: reader_class(reader, cp)?,
        }),
        // anewarray
        0xbd => Ok(Instruction::ANewArray {
            class: reader_class(reader, cp)?,
        }),
        // checkcast
        0xc0 => Ok(Instruction::CheckCast {
            class: reader_class(reader, cp)?,
        }),
        // instanceof
        0xc1 => Ok(Instruction::InstanceOf {
            class: reader_class(reader, cp)?,
        }),
        // multianewarray
        0xc5 => {
            let index = reader.read_u2()?;
            let dimensions = reader.read_u1()?;
            Ok(Instruction::MultiANewArray {
                class: cp.get_class_name(index)?,
                dimensions,
            })
        }

        // getstatic / putstatic / getfield / putfield
        0xb2 | 0xb3 | 0xb4 | 0xb5 => {
            let index = reader.read_u2()?;
            let (owner, name, descriptor) = cp.get_ref(index)?;
            Ok(match opcode {
                0xb2 => Instruction::GetStatic { owner, name, descriptor },
                0xb3 => Instruction::PutStatic { owner, name, descriptor },
                0xb4 => Instruction::GetField { owner, name, descriptor },
                _ => Instruction::PutField { owner, name, descriptor },
            })
        }

        // invokevirtual / invokespecial / invokestatic
        0xb6 | 0xb7 | 0xb8 => {
            let index = reader.read_u2()?;
            let (owner, name, descriptor) = cp.get_ref(index)?;
            Ok(match opcode {
                0xb6 => Instruction::InvokeVirtual { owner, name, descriptor },
                0xb7 => Instruction::InvokeSpecial { owner, name, descriptor },
                _ => Instruction::InvokeStatic { owner, name, descriptor },
            })
        }
        // invokeinterface
        0xb9 => {
            let index = reader.read_u2()?;
            let _count = reader.read_u1()?;
            let _zero = reader.read_u1()?;
            let (owner, name, descriptor) = cp.get_ref(index)?;
            Ok(Instruction::InvokeInterface { owner, name, descriptor })
        }
        // invokedynamic
        0xba => {
            let index = reader.read_u2()?;
            let _zero1 = reader.read_u1()?;
            let _zero2 = reader.read_u1()?;
            let (name, descriptor) = cp.get_invoke_dynamic_name_and_type(index)?;
            Ok(Instruction::InvokeDynamic { name, descriptor })
        }

        // wide: modifies the operand width of the following instruction.
        0xc4 => {
            let modified = reader.read_u1()?;
            match modified {
                // iload, fload, aload, lload, dload, istore, fstore, astore,
                // lstore, dstore, ret: u2 index.
                0x15..=0x19 | 0x36..=0x3a | 0xa9 => {
                    reader.read_u2()?;
                    Ok(Instruction::Other(opcode))
                }
                // iinc: u2 index, i2 const.
                0x84 => {
                    reader.read_u2()?;
                    reader.read_i2()?;
                    Ok(Instruction::Other(opcode))
                }
                _ => Err(Error::MalformedAttribute("Code")),
            }
        }

        // tableswitch / lookupswitch: padded to a 4-byte boundary measured
        // from the start of the method's code array.
        0xaa => {
            skip_switch_padding(reader, instruction_start)?;
            let _default = reader.read_i4()?;
            let low = reader.read_i4()?;
            let high = reader.read_i4()?;
            let count = (i64::from(high) - i64::from(low) + 1).max(0) as usize;
            for _ in 0..count {
                reader.read_i4()?;
            }
            Ok(Instruction::Other(opcode))
        }
        0xab => {
            skip_switch_padding(reader, instruction_start)?;
            let _default = reader.read_i4()?;
            let npairs = reader.read_i4()?;
            for _ in 0..npairs.max(0) {
                reader.read_i4()?;
                reader.read_i4()?;
            }
            Ok(Instruction::Other(opcode))
        }

        other => {
            skip_fixed_operands(reader, other)?;
            Ok(Instruction::Other(other))
        }
    }
}

fn load_constant(cp: &ConstantPool, index: u16) -> Result<Instruction> {
    match cp.get_string_constant(index) {
        Ok(value) => Ok(Instruction::LoadString { value }),
        // Not every `ldc` loads a String; Integer/Float/Class/MethodHandle
        // constants surface here too and none of the scanners care about them.
        Err(_) => Ok(Instruction::Other(0x12)),
    }
}

fn reader_class(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<String> {
    let index = reader.read_u2()?;
    cp.get_class_name(index)
}

fn skip_switch_padding(reader: &mut Reader<'_>, instruction_start: usize) -> Result<()> {
    let offset_from_start = reader.pos() - instruction_start;
    let pad = (4 - (offset_from_start % 4)) % 4;
    reader.read_bytes(pad)?;
    Ok(())
}

/// Advance past the fixed-size operand of opcodes with no structured
/// decoding, per the standard JVM opcode operand-length table (JVMS §6.5).
fn skip_fixed_operands(reader: &mut Reader<'_>, opcode: u8) -> Result<()> {
    let len = match opcode {
        // No operands.
        0x00..=0x0f => 0,
        0x10 => 1,       // bipush
        0x11 => 2,       // sipush
        0x15..=0x19 => 1, // iload, lload, fload, dload, aload
        0x1a..=0x35 => 0,
        0x36..=0x3a => 1, // istore, lstore, fstore, dstore, astore
        0x3b..=0x83 => 0,
        0x84 => 2, // iinc
        0x85..=0x97 => 0,
        0x99..=0xa6 => 2, // ifeq..if_acmpne
        0xa7 | 0xa8 => 2, // goto, jsr
        0xa9 => 1,        // ret
        // 0xaa (tableswitch), 0xab (lookupswitch) handled separately.
        0xac..=0xb1 => 0, // ireturn..return
        0xbc => 1,        // newarray
        0xbe | 0xbf => 0, // arraylength, athrow
        0xc2 | 0xc3 => 0, // monitorenter, monitorexit
        0xc6 | 0xc7 => 2, // ifnull, ifnonnull
        0xc8 | 0xc9 => 4, // goto_w, jsr_w
        // Reserved/implementation opcodes (breakpoint, impdep1, impdep2) and
        // anything else unassigned: no operands, matching the JVM's own
        // treatment of them as no-ops outside a debugger.
        _ => 0,
    };
    if len > 0 {
        reader.read_bytes(len)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_pool::CpInfo;

    fn cp_with(entries: Vec<CpInfo>) -> ConstantPool {
        ConstantPool::from_entries(entries)
    }

    #[test]
    fn decodes_new_checkcast_and_ldc_string() {
        // Constant pool (1-indexed):
        // 1: Utf8 "java/lang/StringBuilder"
        // 2: Class -> 1
        // 3: Utf8 "hello"
        // 4: String -> 3
        let cp = cp_with(vec![
            CpInfo::Utf8("java/lang/StringBuilder".to_string()),
            CpInfo::Class { name_index: 1 },
            CpInfo::Utf8("hello".to_string()),
            CpInfo::String { string_index: 3 },
        ]);

        // new #2; ldc #4; checkcast #2; return
        let code: [u8; 8] = [0xbb, 0x00, 0x02, 0x12, 0x04, 0xc0, 0x00, 0x02];
        let instructions = decode_instructions(&code[..6], &cp).unwrap();
        assert_eq!(
            instructions[0],
            Instruction::New {
                class: "java/lang/StringBuilder".to_string()
            }
        );
        assert_eq!(
            instructions[1],
            Instruction::LoadString {
                value: "hello".to_string()
            }
        );
    }

    #[test]
    fn decodes_invokestatic_ref() {
        // 1: Utf8 "java/lang/System"
        // 2: Class -> 1
        // 3: Utf8 "exit"
        // 4: Utf8 "(I)V"
        // 5: NameAndType -> 3, 4
        // 6: Methodref -> 2, 5
        let cp = cp_with(vec![
            CpInfo::Utf8("java/lang/System".to_string()),
            CpInfo::Class { name_index: 1 },
            CpInfo::Utf8("exit".to_string()),
            CpInfo::Utf8("(I)V".to_string()),
            CpInfo::NameAndType {
                name_index: 3,
                descriptor_index: 4,
            },
            CpInfo::Methodref {
                class_index: 2,
                name_and_type_index: 5,
            },
        ]);

        let code: [u8; 3] = [0xb8, 0x00, 0x06]; // invokestatic #6
        let instructions = decode_instructions(&code, &cp).unwrap();
        assert_eq!(
            instructions[0],
            Instruction::InvokeStatic {
                owner: "java/lang/System".to_string(),
                name: "exit".to_string(),
                descriptor: "(I)V".to_string(),
            }
        );
    }

    #[test]
    fn skips_unmodeled_opcodes_without_panicking() {
        let cp = cp_with(vec![]);
        // iconst_0 (0x03), bipush 42 (0x10 0x2a), return (0xb1)
        let code: [u8; 4] = [0x03, 0x10, 0x2a, 0xb1];
        let instructions = decode_instructions(&code, &cp).unwrap();
        assert_eq!(instructions.len(), 3);
        assert!(matches!(instructions[0], Instruction::Other(0x03)));
        assert!(matches!(instructions[1], Instruction::Other(0x10)));
        assert!(matches!(instructions[2], Instruction::Other(0xb1)));
    }

    #[test]
    fn tableswitch_padding_and_offsets_are_skipped() {
        let cp = cp_with(vec![]);
        // One leading nop (0x00) so the switch does not start 4-byte aligned,
        // exercising the padding computation.
        // tableswitch: default=0, low=0, high=1, two 4-byte offsets.
        let mut code = vec![0x00u8, 0xaa];
        code.extend_from_slice(&[0, 0, 0]); // 3 bytes padding to align to 4
        code.extend_from_slice(&0i32.to_be_bytes()); // default
        code.extend_from_slice(&0i32.to_be_bytes()); // low
        code.extend_from_slice(&1i32.to_be_bytes()); // high
        code.extend_from_slice(&10i32.to_be_bytes()); // offset[0]
        code.extend_from_slice(&20i32.to_be_bytes()); // offset[1]

        let instructions = decode_instructions(&code, &cp).unwrap();
        assert_eq!(instructions.len(), 2);
        assert!(matches!(instructions[1], Instruction::Other(0xaa)));
    }
}
