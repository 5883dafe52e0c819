//! 64-битный блочный шифр (сеть Фейстеля, 32 раунда) в режиме гаммирования.
//!
//! Гамма = шифрование продвинутой синхропосылки, данные XOR-ятся с гаммой.
//! Поэтому зашифрование и расшифрование одна и та же операция, а слои
//! разных игроков можно снимать в любом порядке.

/// Таблица замен: строка i применяется к i-му полубайту.
const SBOX: [[u8; 16]; 8] = [
    [0xF, 0xC, 0x2, 0xA, 0x6, 0x4, 0x5, 0x0, 0x7, 0x9, 0xE, 0xD, 0x1, 0xB, 0x8, 0x3],
    [0xB, 0x6, 0x3, 0x4, 0xC, 0xF, 0xE, 0x2, 0x7, 0xD, 0x8, 0x0, 0x5, 0xA, 0x9, 0x1],
    [0x1, 0xC, 0xB, 0x0, 0xF, 0xE, 0x6, 0x5, 0xA, 0xD, 0x4, 0x8, 0x9, 0x3, 0x7, 0x2],
    [0x1, 0x5, 0xE, 0xC, 0xA, 0x7, 0x0, 0xD, 0x6, 0x2, 0xB, 0x4, 0x9, 0x3, 0xF, 0x8],
    [0x0, 0xC, 0x8, 0x9, 0xD, 0x2, 0xA, 0xB, 0x7, 0x3, 0x6, 0x5, 0x4, 0xE, 0xF, 0x1],
    [0x8, 0x0, 0xF, 0x3, 0x2, 0x5, 0xE, 0xB, 0x1, 0xA, 0x4, 0x7, 0xC, 0x9, 0xD, 0x6],
    [0x3, 0x0, 0x6, 0xF, 0x1, 0xE, 0x9, 0x2, 0xD, 0x8, 0xC, 0x4, 0xB, 0xA, 0x5, 0x7],
    [0x1, 0xA, 0x6, 0x8, 0xF, 0xB, 0x0, 0x4, 0xC, 0x3, 0x5, 0x9, 0x7, 0xD, 0x2, 0xE],
];

/// Порядок подключей по раундам: трижды прямо, последний проход обратно.
const KEY_SCHEDULE: [usize; 32] = [
    0, 1, 2, 3, 4, 5, 6, 7, //
    0, 1, 2, 3, 4, 5, 6, 7, //
    0, 1, 2, 3, 4, 5, 6, 7, //
    7, 6, 5, 4, 3, 2, 1, 0,
];

const SYNCHRO_C1: u32 = 0x0101_0101;
const SYNCHRO_C2: u32 = 0x0101_0104;

/// Ключ шифра: восемь 32-битных подключей.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GostKey {
    subkeys: [u32; 8],
}

impl GostKey {
    /// 32 байта ключа, подключи в little-endian.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut subkeys = [0u32; 8];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            subkeys[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self { subkeys }
    }
}

/// Продвинуть синхропосылку (рекуррентный генератор).
pub fn advance_synchro(synchro: u64) -> u64 {
    let n1 = (synchro as u32).wrapping_add(SYNCHRO_C1) % 0x1000_0000;
    let n2 = ((synchro >> 32) as u32).wrapping_add(SYNCHRO_C2) % 0xFFFF_FFFF;
    (u64::from(n2) << 32) | u64::from(n1)
}

/// Подстановка по таблице замен.
///
/// Полубайт i собирается из битов суммы, начиная со старшего:
/// бит b полубайта = бит (31 - 4i - b) суммы. Результат укладывается
/// обратно начиная с младшего: бит b полубайта i = бит (4i + b).
fn substitute(sum: u32) -> u32 {
    let mut out = 0u32;
    for (i, row) in SBOX.iter().enumerate() {
        let mut nibble = 0usize;
        for b in 0..4 {
            let src = 31 - 4 * i - b;
            nibble |= (((sum >> src) & 1) as usize) << b;
        }
        out |= u32::from(row[nibble]) << (4 * i);
    }
    out
}

/// Основной шаг: 32 раунда над 64-битным блоком.
pub fn main_step(block: u64, key: &GostKey) -> u64 {
    let mut left = block as u32;
    let mut right = (block >> 32) as u32;

    for &k in KEY_SCHEDULE.iter() {
        let sum = left.wrapping_add(key.subkeys[k] % 0x7FFF_FFFF);
        let s = substitute(sum).rotate_left(11) ^ right;
        right = left;
        left = s;
    }

    (u64::from(left) << 32) | u64::from(right)
}

/// Гамма для одного блока.
pub fn gamma(key: &GostKey, synchro: u64) -> u64 {
    main_step(advance_synchro(synchro), key)
}

/// Наложить гамму на 8-байтовый блок (и зашифрование, и расшифрование).
pub fn apply_gamma(block: [u8; 8], key: &[u8; 32], synchro: &[u8; 8]) -> [u8; 8] {
    let key = GostKey::from_bytes(key);
    let g = gamma(&key, u64::from_le_bytes(*synchro));
    (u64::from_le_bytes(block) ^ g).to_le_bytes()
}
