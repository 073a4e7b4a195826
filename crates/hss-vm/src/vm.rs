//! Fetch-decode-execute loop.
//!
//! Every instruction is followed by `IP += 1` (wrapping), except halt.
//! Control transfers therefore store `target - 1`, and push-immediate steps
//! IP over its two operand bytes itself. The opcode fetch only uses the low
//! byte of IP; immediate operands are read at the full 16-bit address.

use std::path::{Path, PathBuf};

use hss_common_core::{Image, Instruction, Opcode, UWord};
use hss_runtime::{info, warn, Console, ExtensionLoader, SaveStore, VmResult};

use crate::config::VmConfig;
use crate::exec::{self, jump_target};
use crate::machine::Machine;
use crate::os::Os;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecResult {
    Continue,
    Halt,
}

/// Where reset reloads the image from.
enum ImageSource {
    File(PathBuf),
    Memory(Image),
}

pub struct Vm {
    machine: Machine,
    os: Os,
    source: ImageSource,
    trace: bool,
}

impl Vm {
    /// Load `config.image`, printing to stdout and loading extensions from
    /// the configured directories.
    pub fn load(config: &VmConfig) -> VmResult<Self> {
        let extensions = ExtensionLoader::with_search_dirs(config.lib_dirs.clone());
        let os = Os::new(
            Console::stdout(),
            SaveStore::new(&config.save),
            Box::new(extensions),
        );
        let mut vm = Self::open(&config.image, os)?;
        vm.trace = config.trace;
        Ok(vm)
    }

    /// Load an image file; reset reloads it from disk.
    pub fn open(path: &Path, os: Os) -> VmResult<Self> {
        let image = read_image(path)?;
        Ok(Self {
            machine: Machine::new(image),
            os,
            source: ImageSource::File(path.to_path_buf()),
            trace: false,
        })
    }

    /// Run an in-memory image; reset restores this image.
    pub fn new(image: Image, os: Os) -> Self {
        Self {
            machine: Machine::new(image.clone()),
            os,
            source: ImageSource::Memory(image),
            trace: false,
        }
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn os(&self) -> &Os {
        &self.os
    }

    /// Run until halt or a fatal error. Program output is flushed either way.
    pub fn run(&mut self) -> VmResult<()> {
        loop {
            match self.step() {
                Ok(ExecResult::Continue) => {}
                Ok(ExecResult::Halt) => return Ok(()),
                Err(e) => {
                    let _ = self.os.flush();
                    return Err(e);
                }
            }
        }
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> VmResult<ExecResult> {
        let ip = self.machine.ip();
        let inst = Instruction::decode(self.machine.read_code(ip & 0x00FF));
        if self.trace {
            info!("{:04X}: {}", ip, inst);
        }

        let m = &mut self.machine;
        match inst {
            Instruction::Extended(op) => match op {
                Opcode::Nop => {}
                Opcode::Interrupt => self.os.interrupt(m)?,
                Opcode::Reset => self.reset()?,
                Opcode::Dup => exec::exec_dup(m)?,
                Opcode::Halt => {
                    self.os.flush()?;
                    return Ok(ExecResult::Halt);
                }
                Opcode::PushImm => exec::exec_push_imm(m)?,
                Opcode::Call => exec::exec_call(m)?,
                Opcode::Return => exec::exec_return(m)?,
                Opcode::Load => exec::exec_load(m)?,
                Opcode::Store => exec::exec_store(m)?,
                Opcode::Add => exec::exec_add(m)?,
                Opcode::Sub => exec::exec_sub(m)?,
                Opcode::Mul => exec::exec_mul(m)?,
                Opcode::Mod => exec::exec_mod(m)?,
                Opcode::Div => exec::exec_div(m)?,
                Opcode::RegSwap => exec::exec_reg_swap(m)?,
                Opcode::And => exec::exec_and(m)?,
                Opcode::Or => exec::exec_or(m)?,
                Opcode::Xor => exec::exec_xor(m)?,
                Opcode::Not => exec::exec_not(m)?,
                Opcode::Swap => exec::exec_swap(m)?,
                Opcode::Neg => exec::exec_neg(m)?,
                Opcode::CmpSigned => exec::exec_cmp_signed(m)?,
                Opcode::CmpUnsigned => exec::exec_cmp_unsigned(m)?,
                Opcode::Jump => exec::exec_jump(m)?,
                Opcode::JumpIfZero => exec::exec_jump_if_zero(m)?,
            },
            Instruction::Register { op, reg } => exec::exec_register(m, op, reg)?,
            Instruction::Unassigned(_) => {}
        }

        let next = self.machine.ip().wrapping_add(1);
        self.machine.set_ip(next);
        Ok(ExecResult::Continue)
    }

    /// Reload the image, clear the stack and registers, release the save
    /// file and the name table. The next fetch is at address 0.
    pub fn reset(&mut self) -> VmResult<()> {
        let image = match &self.source {
            ImageSource::File(path) => read_image(path)?,
            ImageSource::Memory(image) => image.clone(),
        };
        self.machine.load(image);
        self.os.reset()?;
        self.machine.set_ip(jump_target(0));
        Ok(())
    }

    /// IP of the next instruction.
    pub fn ip(&self) -> UWord {
        self.machine.ip()
    }
}

fn read_image(path: &Path) -> VmResult<Image> {
    info!("loading {}", path.display());
    let (image, ignored) = Image::read(path)?;
    if ignored > 0 {
        warn!(
            "{}: ignoring {} trailing bytes past the data segment",
            path.display(),
            ignored
        );
    }
    Ok(image)
}
