use indoc::indoc as asm;
use pretty_assertions::assert_eq;
use sim8086::{decode_lines, disassemble, DecodeError, Decoder};

#[test]
fn test_add_sub_cmp_jnz() {
  let bytes = [
    0x03, 0x18, // add bx, [bx + si]
    0x03, 0x5E, 0x00, // add bx, [bp]
    0x83, 0xC6, 0x02, // add si, 2
    0x83, 0xC5, 0x02, // add bp, 2
    0x83, 0xC1, 0x08, // add cx, 8
    0x03, 0x5E, 0x00, // add bx, [bp]
    0x03, 0x4F, 0x02, // add cx, [bx + 2]
    0x02, 0x7A, 0x04, // add bh, [bp + si + 4]
    0x03, 0x7B, 0x06, // add di, [bp + di + 6]
    0x01, 0x18, // add [bx + si], bx
    0x01, 0x5E, 0x00, // add [bp], bx
    0x80, 0x07, 0x22, // add [bx], byte 34
    0x83, 0x82, 0xE8, 0x03, 0x1D, // add [bp + si + 1000], byte 29
    0x05, 0xE8, 0x03, // add ax, 1000
    0x04, 0xE2, // add al, -30
    0x04, 0x09, // add al, 9
    0x2B, 0x18, // sub bx, [bx + si]
    0x83, 0xEE, 0x02, // sub si, 2
    0x2C, 0x09, // sub al, 9
    0x3B, 0x18, // cmp bx, [bx + si]
    0x83, 0xFE, 0x02, // cmp si, 2
    0x3C, 0x09, // cmp al, 9
    0x75, 0x02, // jne 2
    0x74, 0xFC, // je -4
    0x7C, 0xFA, // jl -6
  ];
  assert_eq!(
    disassemble(&bytes).unwrap(),
    asm! {"
      bits 16
      add bx, [bx + si]
      add bx, [bp]
      add si, 2
      add bp, 2
      add cx, 8
      add bx, [bp]
      add cx, [bx + 2]
      add bh, [bp + si + 4]
      add di, [bp + di + 6]
      add [bx + si], bx
      add [bp], bx
      add [bx], byte 34
      add [bp + si + 1000], byte 29
      add ax, 1000
      add al, -30
      add al, 9
      sub bx, [bx + si]
      sub si, 2
      sub al, 9
      cmp bx, [bx + si]
      cmp si, 2
      cmp al, 9
      jne 2
      je -4
      jl -6
    "}
  );
}

#[test]
fn test_challenge_movs() {
  let bytes = [
    0x8B, 0x41, 0xDB, // mov ax, [bx + di - 37]
    0x89, 0x8C, 0xD4, 0xFE, // mov [si - 300], cx
    0x8B, 0x57, 0xE0, // mov dx, [bx - 32]
    0xC6, 0x03, 0x07, // mov [bp + di], byte 7
    0xC7, 0x85, 0x85, 0x03, 0x5B, 0x01, // mov [di + 901], word 347
    0x8B, 0x2E, 0x05, 0x00, // mov bp, [5]
    0x8B, 0x1E, 0x82, 0x0D, // mov bx, [3458]
    0xA1, 0xFB, 0x09, // mov ax, [2555]
    0xA1, 0x10, 0x00, // mov ax, [16]
    0xA3, 0xFA, 0x09, // mov [2554], ax
    0xA3, 0x0F, 0x00, // mov [15], ax
  ];
  assert_eq!(
    decode_lines(&bytes).unwrap(),
    [
      "mov ax, [bx + di - 37]",
      "mov [si - 300], cx",
      "mov dx, [bx - 32]",
      "mov [bp + di], byte 7",
      "mov [di + 901], word 347",
      "mov bp, [5]",
      "mov bx, [3458]",
      "mov ax, [2555]",
      "mov ax, [16]",
      "mov [2554], ax",
      "mov [15], ax",
    ]
  );
}

#[test]
fn test_unmatched_final_byte_ends_cleanly() {
  assert_eq!(decode_lines(&[0x89, 0xD8, 0xF4]).unwrap(), ["mov ax, bx"]);
  let mut decoder = Decoder::new(&[0xF4]);
  assert!(decoder.next().is_none());
  assert_eq!(decoder.cursor(), 1);
}

#[test]
fn test_truncation_emits_no_partial_listing() {
  let err = disassemble(&[0x89, 0xD8, 0xC7, 0x85, 0x85]).unwrap_err();
  assert_eq!(
    err,
    DecodeError::OutOfBounds {
      start: 2,
      offset: 5,
      len: 5
    }
  );
  assert_eq!(
    err.to_string(),
    "out of bounds: instruction at offset 2 needs byte 5 but the buffer holds 5"
  );
}

#[test]
fn test_empty_buffer() {
  assert_eq!(disassemble(&[]).unwrap(), "bits 16\n");
}
