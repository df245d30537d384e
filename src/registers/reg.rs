use std::fmt;

/// General purpose register families of x86_64. The payload is the width in
/// bits of the view being named, so `RAX(32)` is `%eax`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum X86_64Register {
  RAX(u8),
  RBX(u8),
  RCX(u8),
  RDX(u8),
  RSI(u8),
  RDI(u8),
  RBP(u8),
  RSP(u8),
  R8(u8),
  R9(u8),
  R10(u8),
  R11(u8),
  R12(u8),
  R13(u8),
  R14(u8),
  R15(u8),
}

/// Widths every family can be viewed at, narrowest first.
pub const VIEW_WIDTHS: [u8; 4] = [8, 16, 32, 64];

impl X86_64Register {
  pub const fn width(&self) -> u8 {
    match *self {
      X86_64Register::RAX(w)
      | X86_64Register::RBX(w)
      | X86_64Register::RCX(w)
      | X86_64Register::RDX(w)
      | X86_64Register::RSI(w)
      | X86_64Register::RDI(w)
      | X86_64Register::RBP(w)
      | X86_64Register::RSP(w)
      | X86_64Register::R8(w)
      | X86_64Register::R9(w)
      | X86_64Register::R10(w)
      | X86_64Register::R11(w)
      | X86_64Register::R12(w)
      | X86_64Register::R13(w)
      | X86_64Register::R14(w)
      | X86_64Register::R15(w) => w,
    }
  }

  /// Width in bytes of this view.
  pub const fn byte_size(&self) -> u32 {
    self.width() as u32 / 8
  }

  /// The same family viewed at another width.
  pub const fn with_width(&self, width: u8) -> Self {
    match self {
      X86_64Register::RAX(_) => X86_64Register::RAX(width),
      X86_64Register::RBX(_) => X86_64Register::RBX(width),
      X86_64Register::RCX(_) => X86_64Register::RCX(width),
      X86_64Register::RDX(_) => X86_64Register::RDX(width),
      X86_64Register::RSI(_) => X86_64Register::RSI(width),
      X86_64Register::RDI(_) => X86_64Register::RDI(width),
      X86_64Register::RBP(_) => X86_64Register::RBP(width),
      X86_64Register::RSP(_) => X86_64Register::RSP(width),
      X86_64Register::R8(_) => X86_64Register::R8(width),
      X86_64Register::R9(_) => X86_64Register::R9(width),
      X86_64Register::R10(_) => X86_64Register::R10(width),
      X86_64Register::R11(_) => X86_64Register::R11(width),
      X86_64Register::R12(_) => X86_64Register::R12(width),
      X86_64Register::R13(_) => X86_64Register::R13(width),
      X86_64Register::R14(_) => X86_64Register::R14(width),
      X86_64Register::R15(_) => X86_64Register::R15(width),
    }
  }

  /// All views of this family, narrowest first.
  pub fn views(&self) -> [X86_64Register; 4] {
    [self.as_8bit(), self.as_16bit(), self.as_32bit(), self.as_64bit()]
  }

  pub const fn is_callee_saved(&self) -> bool {
    matches!(
      self,
      X86_64Register::RBX(_)
        | X86_64Register::RBP(_)
        | X86_64Register::R12(_)
        | X86_64Register::R13(_)
        | X86_64Register::R14(_)
        | X86_64Register::R15(_)
    )
  }

  /// Names of the 8, 16, 32 and 64-bit views.
  const fn view_names(&self) -> [&'static str; 4] {
    match self {
      X86_64Register::RAX(_) => ["al", "ax", "eax", "rax"],
      X86_64Register::RBX(_) => ["bl", "bx", "ebx", "rbx"],
      X86_64Register::RCX(_) => ["cl", "cx", "ecx", "rcx"],
      X86_64Register::RDX(_) => ["dl", "dx", "edx", "rdx"],
      X86_64Register::RSI(_) => ["sil", "si", "esi", "rsi"],
      X86_64Register::RDI(_) => ["dil", "di", "edi", "rdi"],
      X86_64Register::RBP(_) => ["bpl", "bp", "ebp", "rbp"],
      X86_64Register::RSP(_) => ["spl", "sp", "esp", "rsp"],
      X86_64Register::R8(_) => ["r8b", "r8w", "r8d", "r8"],
      X86_64Register::R9(_) => ["r9b", "r9w", "r9d", "r9"],
      X86_64Register::R10(_) => ["r10b", "r10w", "r10d", "r10"],
      X86_64Register::R11(_) => ["r11b", "r11w", "r11d", "r11"],
      X86_64Register::R12(_) => ["r12b", "r12w", "r12d", "r12"],
      X86_64Register::R13(_) => ["r13b", "r13w", "r13d", "r13"],
      X86_64Register::R14(_) => ["r14b", "r14w", "r14d", "r14"],
      X86_64Register::R15(_) => ["r15b", "r15w", "r15d", "r15"],
    }
  }
}

impl fmt::Display for X86_64Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names = self.view_names();
    match self.width() {
      8 => write!(f, "%{}", names[0]),
      16 => write!(f, "%{}", names[1]),
      32 => write!(f, "%{}", names[2]),
      64 => write!(f, "%{}", names[3]),
      w => write!(f, "%{}<{}>", names[3], w),
    }
  }
}

/// `%xmm0` .. `%xmm15`, 128 bits wide.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct XmmRegister(pub u8);

impl XmmRegister {
  pub const BYTE_SIZE: u32 = 16;
}

impl fmt::Display for XmmRegister {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "%xmm{}", self.0)
  }
}

/// `%st0` .. `%st7`, the 80-bit x87 stack.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct X87Register(pub u8);

impl X87Register {
  pub const BYTE_SIZE: u32 = 10;
}

impl fmt::Display for X87Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "%st{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_view_names() {
    assert_eq!(X86_64Register::RAX(8).to_string(), "%al");
    assert_eq!(X86_64Register::RSI(8).to_string(), "%sil");
    assert_eq!(X86_64Register::R9(16).to_string(), "%r9w");
    assert_eq!(X86_64Register::RBX(32).to_string(), "%ebx");
    assert_eq!(X86_64Register::R15(64).to_string(), "%r15");
    assert_eq!(XmmRegister(11).to_string(), "%xmm11");
    assert_eq!(X87Register(0).to_string(), "%st0");
  }

  #[test]
  fn test_views_share_family() {
    let views = X86_64Register::R12(64).views();
    assert_eq!(views.len(), VIEW_WIDTHS.len());
    for (view, width) in views.iter().zip(VIEW_WIDTHS) {
      assert_eq!(view.width(), width);
      assert_eq!(view.as_64bit(), X86_64Register::R12(64));
      assert!(view.is_callee_saved());
    }
    assert_eq!(X86_64Register::RDX(16).byte_size(), 2);
  }
}
